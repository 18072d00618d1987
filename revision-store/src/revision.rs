use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{Error, Fingerprint};

/// The last known revision of a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Revision {
    /// Always set by [`crate::Store::update`], but a revision file may carry
    /// `null` here, in which case only the text can be compared.
    pub fingerprint: Option<Fingerprint>,
    pub text: String,
}

/// Every tracked revision, along with the time any of them was last updated.
///
/// This is the unit of persistence: the whole set is read and written at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSet {
    pub last_updated: Option<DateTime<Local>>,

    /// Revisions keyed by artifact name. A `BTreeMap` keeps the file stable
    /// between saves.
    pub revisions: BTreeMap<String, Revision>,
}

impl RevisionSet {
    /// Reads a revision set from the JSON file at `path`.
    pub fn load<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Writes the revision set to `path`.
    ///
    /// The data is written to a temporary file alongside `path`, which then
    /// replaces `path` in one rename. If anything fails, `path` keeps its
    /// previous content. An existing file keeps its permissions.
    pub fn save<P>(&self, path: P) -> Result<(), Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(&mut file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        if let Ok(metadata) = fs::metadata(path) {
            file.as_file().set_permissions(metadata.permissions())?;
        }
        file.as_file().sync_all()?;
        file.persist(path)?;

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.last_updated.is_none() && self.revisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn revision(fingerprint: u64, text: &str) -> Revision {
        Revision {
            fingerprint: Some(fingerprint.into()),
            text: text.into(),
        }
    }

    #[test]
    fn test_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("revisions.json");

        let mut set = RevisionSet {
            last_updated: Some(Local.timestamp_opt(1_600_000_000, 123_456_789).unwrap()),
            ..Default::default()
        };
        set.revisions
            .insert("f".into(), revision(1, "def f(): return 1"));
        set.revisions.insert("empty".into(), revision(2, ""));
        set.revisions
            .insert("quoted".into(), revision(3, "s = \"]}, {\\\"\"\n\ttab"));

        set.save(&path)?;
        assert_eq!(RevisionSet::load(&path)?, set);

        Ok(())
    }

    #[test]
    fn test_empty_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("revisions.json");

        RevisionSet::default().save(&path)?;

        let loaded = RevisionSet::load(&path)?;
        assert!(loaded.is_empty());
        assert_eq!(loaded, RevisionSet::default());

        Ok(())
    }

    #[test]
    fn test_file_shape() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("revisions.json");

        let mut set = RevisionSet::default();
        set.revisions.insert("f".into(), revision(7, "body"));
        set.save(&path)?;

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(
            value,
            serde_json::json!({
                "lastUpdated": null,
                "revisions": {
                    "f": { "fingerprint": 7, "text": "body" }
                }
            })
        );

        Ok(())
    }

    #[test]
    fn test_load_null_fingerprint() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("revisions.json");
        fs::write(
            &path,
            r#"{"lastUpdated":null,"revisions":{"f":{"fingerprint":null,"text":"x"},"g":{"fingerprint":5,"text":"y"}}}"#,
        )?;

        let set = RevisionSet::load(&path)?;
        assert_eq!(
            set.revisions.get("f"),
            Some(&Revision {
                fingerprint: None,
                text: "x".into(),
            })
        );
        assert_eq!(set.revisions.get("g"), Some(&revision(5, "y")));

        // The null survives being written back out.
        set.save(&path)?;
        assert_eq!(RevisionSet::load(&path)?, set);

        Ok(())
    }

    #[test]
    fn test_load_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        let missing = RevisionSet::load(dir.path().join("missing.json")).unwrap_err();
        assert!(missing.is_not_found());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "[None, {}]")?;
        let err = RevisionSet::load(&garbage).unwrap_err();
        assert!(matches!(err, Error::Serialisation(_)));
        assert!(!err.is_not_found());

        Ok(())
    }

    #[test]
    fn test_failed_save_leaves_file_alone() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        // A path inside a directory that doesn't exist can't be written.
        let path = dir.path().join("missing").join("revisions.json");
        assert!(RevisionSet::default().save(&path).is_err());
        assert!(!path.exists());

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("revisions.json");
        fs::write(&path, "{}")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;

        RevisionSet::default().save(&path)?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o644);

        Ok(())
    }
}
