//! Validation behavior through the public compile entry point

use schemac_core::{compile_json, Bounds, ColumnType, DefaultValue, ErrorKind, Location, OnDelete};

fn table(columns: &str) -> String {
    format!(
        r#"[{{"name": "app", "type": "fixed", "tables": [{{"name": "things", "columns": {}}}]}}]"#,
        columns
    )
}

#[test]
fn duplicate_codes_and_names() {
    let codes = compile_json(&table(
        r#"[{"name": "kind", "type": "code", "values": [{"code": 0, "value": "A"}, {"code": 0, "value": "B"}]}]"#,
    ))
    .unwrap_err();
    assert_eq!(codes.kind, ErrorKind::Reference);

    let names = compile_json(&table(
        r#"[{"name": "kind", "type": "code", "values": [{"code": 0, "value": "A"}, {"code": 1, "value": "A"}]}]"#,
    ))
    .unwrap_err();
    assert_eq!(names.kind, ErrorKind::Reference);
}

#[test]
fn code_ceiling() {
    let over = compile_json(&table(
        r#"[{"name": "kind", "type": "code", "values": [{"code": 256, "value": "MAX"}]}]"#,
    ))
    .unwrap_err();
    assert_eq!(over.kind, ErrorKind::Range);
    assert_eq!(over.location, Some(Location::column("app", "things", "kind")));

    assert!(compile_json(&table(
        r#"[{"name": "kind", "type": "code", "values": [{"code": 255, "value": "MAX"}]}]"#,
    ))
    .is_ok());
}

#[test]
fn foreign_key_inherits_target_bounds() {
    let schema = compile_json(
        r#"[{"name": "app", "type": "fixed", "tables": [
            {"name": "accounts", "columns": [
                {"name": "balance", "type": "integer", "size": "INT", "minValue": -50, "maxValue": 5000}
            ]},
            {"name": "ledger", "columns": [
                {"name": "balanceRef", "type": "FK", "column": "accounts.balance",
                 "nullable": true, "defaultValue": 10, "ondelete": "set null"}
            ]}
        ]}]"#,
    )
    .unwrap();

    let core = schema.core().unwrap();
    let target = core.find_table("accounts").unwrap().find_column("balance").unwrap();
    let fk = core.find_table("ledger").unwrap().find_column("balanceRef").unwrap();

    assert_eq!(fk.bounds(), target.bounds());
    assert_eq!(fk.bounds(), Some(Bounds::new(-50, 5000)));
    assert!(fk.nullable);
    assert_eq!(fk.default, Some(DefaultValue::Integer(10)));
    assert_eq!(fk.foreign_key.as_ref().unwrap().on_delete, Some(OnDelete::SetNull));
}

#[test]
fn foreign_key_default_outside_target_bounds() {
    let err = compile_json(
        r#"[{"name": "app", "type": "fixed", "tables": [
            {"name": "users", "columns": [{"name": "id", "type": "serial", "size": "TINYINT"}]},
            {"name": "posts", "columns": [
                {"name": "authorId", "type": "FK", "column": "users.id", "defaultValue": 0}
            ]}
        ]}]"#,
    )
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Range);
    assert_eq!(err.location, Some(Location::column("app", "posts", "authorId")));
}

#[test]
fn nullable_foreign_key_target() {
    let err = compile_json(
        r#"[{"name": "app", "type": "fixed", "tables": [
            {"name": "users", "columns": [{"name": "parentId", "type": "integer", "size": "INT", "nullable": true}]},
            {"name": "posts", "columns": [{"name": "ownerId", "type": "FK", "column": "users.parentId"}]}
        ]}]"#,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Reference);
}

#[test]
fn instance_database_references_core_by_type() {
    let schema = compile_json(
        r#"[
            {"name": "app", "type": "fixed", "tables": [
                {"name": "users", "columns": [{"name": "id", "type": "serial", "size": "MEDIUMINT"}]}
            ]},
            {"name": "tenant", "type": "instance", "tables": [
                {"name": "sessions", "columns": [{"name": "userId", "type": "FK", "column": "fixed.users.id"}]}
            ]}
        ]"#,
    )
    .unwrap();

    let user_id = schema
        .instance()
        .and_then(|db| db.find_table("sessions"))
        .and_then(|t| t.find_column("userId"))
        .unwrap();
    let fk = user_id.foreign_key.as_ref().unwrap();

    assert!(fk.cross_database);
    assert_eq!(fk.database, "app");
    assert!(matches!(
        user_id.column_type,
        ColumnType::Integer { auto_increment: false, bounds, .. } if bounds == Bounds::new(1, 16_777_215)
    ));
}

#[test]
fn database_count() {
    assert_eq!(compile_json("[]").unwrap_err().kind, ErrorKind::Structural);
    assert_eq!(
        compile_json(
            r#"[{"name": "a", "type": "fixed"}, {"name": "b", "type": "instance"}, {"name": "c", "type": "instance"}]"#
        )
        .unwrap_err()
        .kind,
        ErrorKind::Structural
    );
    assert_eq!(compile_json(r#"{"name": "a"}"#).unwrap_err().kind, ErrorKind::Structural);
}
