//! Emitted artifacts and atomic writing

use std::fs;
use std::path::{Path, PathBuf};

use schemac_core::ArtifactDigest;

use crate::error::EngineError;

/// One output file, fully rendered in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name inside the output directory
    pub file_name: String,
    pub contents: String,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    pub fn digest(&self) -> ArtifactDigest {
        ArtifactDigest::of(&self.file_name, &self.contents)
    }
}

/// Write every artifact into `dir`, all or nothing
///
/// All contents go to sibling temporary files first. Only when every
/// temporary file is written are they renamed into place. Existing targets
/// are moved aside before being replaced; if any rename fails, the targets
/// already replaced are restored and the temporaries removed.
pub fn write_atomically(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<ArtifactDigest>, EngineError> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let target = dir.join(&artifact.file_name);
        let temp = dir.join(format!(".{}.tmp", artifact.file_name));
        if let Err(e) = fs::write(&temp, &artifact.contents) {
            discard(&staged);
            let _ = fs::remove_file(&temp);
            return Err(EngineError::io(temp, e));
        }
        staged.push((temp, target));
    }

    // (target, backup of the previous file if there was one)
    let mut committed: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());

    for (index, (temp, target)) in staged.iter().enumerate() {
        let backup = if target.is_file() {
            let backup = backup_path(target);
            if let Err(e) = fs::rename(target, &backup) {
                roll_back(&committed);
                discard(&staged[index..]);
                return Err(EngineError::io(target, e));
            }
            Some(backup)
        } else {
            None
        };

        if let Err(e) = fs::rename(temp, target) {
            if let Some(backup) = &backup {
                let _ = fs::rename(backup, target);
            }
            roll_back(&committed);
            discard(&staged[index..]);
            return Err(EngineError::io(target, e));
        }
        tracing::debug!(file = %target.display(), "wrote artifact");
        committed.push((target.as_path(), backup));
    }

    for (_, backup) in &committed {
        if let Some(backup) = backup {
            let _ = fs::remove_file(backup);
        }
    }

    Ok(artifacts.iter().map(Artifact::digest).collect())
}

fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.bak", name))
}

/// Undo committed renames, newest first
fn roll_back(committed: &[(&Path, Option<PathBuf>)]) {
    for (target, backup) in committed.iter().rev() {
        match backup {
            Some(backup) => {
                let _ = fs::rename(backup, target);
            }
            None => {
                let _ = fs::remove_file(target);
            }
        }
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_digests() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = vec![
            Artifact::new("shop.core.sql", "USE shop;\n"),
            Artifact::new("shop.inst.sql", "USE tenant;\n"),
        ];

        let digests = write_atomically(dir.path(), &artifacts).unwrap();

        assert_eq!(digests.len(), 2);
        assert_eq!(digests[0], ArtifactDigest::of("shop.core.sql", "USE shop;\n"));
        assert_eq!(
            fs::read_to_string(dir.path().join("shop.inst.sql")).unwrap(),
            "USE tenant;\n"
        );
        assert!(!dir.path().join(".shop.core.sql.tmp").exists());
    }

    #[test]
    fn missing_directory_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let err = write_atomically(&missing, &[Artifact::new("a.js", "x")]).unwrap_err();

        assert!(matches!(err, EngineError::Io { .. }));
        assert!(!missing.exists());
    }

    #[test]
    fn failed_rename_restores_earlier_targets() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.core.sql"), "old core").unwrap();
        fs::create_dir(dir.path().join("app.inst.sql")).unwrap();

        let artifacts = vec![
            Artifact::new("app.core.sql", "new core"),
            Artifact::new("app.inst.sql", "new inst"),
        ];
        let err = write_atomically(dir.path(), &artifacts).unwrap_err();

        assert!(matches!(err, EngineError::Io { .. }));
        assert_eq!(
            fs::read_to_string(dir.path().join("app.core.sql")).unwrap(),
            "old core"
        );
        assert!(dir.path().join("app.inst.sql").is_dir());

        let mut leftovers: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, vec!["app.core.sql", "app.inst.sql"]);
    }

    #[test]
    fn failed_rename_removes_new_targets() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b.js")).unwrap();

        write_atomically(
            dir.path(),
            &[Artifact::new("a.js", "a"), Artifact::new("b.js", "b")],
        )
        .unwrap_err();

        assert!(!dir.path().join("a.js").exists());
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "old").unwrap();

        write_atomically(dir.path(), &[Artifact::new("a.js", "new")]).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), "new");
        assert!(!dir.path().join(".a.js.bak").exists());
    }
}
