//! Persistent storage of the last known revision of named artifacts.
//!
//! A [`Store`] is bound to a single revision file. It loads the whole
//! [`RevisionSet`] when opened, and every mutation writes the whole set back
//! out before it is committed in memory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

mod error;
pub use self::error::Error;

mod fingerprint;
pub use fingerprint::{Blake3, Fingerprint, Fingerprinter};

mod revision;
pub use revision::{Revision, RevisionSet};

#[derive(Debug, Clone)]
pub struct Store<F = Blake3> {
    path: PathBuf,
    set: RevisionSet,
    fingerprinter: F,
}

impl Store {
    /// Opens the revision file at `path` using the default fingerprinter.
    ///
    /// This never fails: see [`Store::with_fingerprinter`].
    pub fn open<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::with_fingerprinter(path, Blake3)
    }
}

impl<F> Store<F>
where
    F: Fingerprinter,
{
    /// Opens the revision file at `path`.
    ///
    /// A missing or unreadable revision file is not an error: the store starts
    /// out empty, and the file will be (re)created on the next update.
    pub fn with_fingerprinter<P>(path: P, fingerprinter: F) -> Self
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let set = match RevisionSet::load(&path) {
            Ok(set) => {
                log::debug!(
                    "loaded {} revision(s) from {}",
                    set.revisions.len(),
                    path.display()
                );
                set
            }
            Err(e) if e.is_not_found() => {
                log::debug!("no revision file at {}; starting empty", path.display());
                RevisionSet::default()
            }
            Err(e) => {
                log::warn!(
                    "cannot load revisions from {}; starting empty: {}",
                    path.display(),
                    e
                );
                RevisionSet::default()
            }
        };

        Self {
            path,
            set,
            fingerprinter,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn revision_set(&self) -> &RevisionSet {
        &self.set
    }

    /// The time of the most recent update to any artifact.
    pub fn last_updated(&self) -> Option<&DateTime<Local>> {
        self.set.last_updated.as_ref()
    }

    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        self.fingerprinter.fingerprint(text)
    }

    pub fn get(&self, name: &str) -> Option<&Revision> {
        self.set.revisions.get(name)
    }

    /// Returns the stored fingerprint and text for `name`, both of which are
    /// `None` if the artifact isn't tracked. A tracked artifact loaded without
    /// a fingerprint only has its text.
    pub fn stored(&self, name: &str) -> (Option<Fingerprint>, Option<&str>) {
        match self.get(name) {
            Some(revision) => (revision.fingerprint, Some(revision.text.as_str())),
            None => (None, None),
        }
    }

    /// Iterates over the tracked artifacts in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Revision)> {
        self.set
            .revisions
            .iter()
            .map(|(name, revision)| (name.as_str(), revision))
    }

    /// Records `text` as the current revision of `name`.
    ///
    /// The updated set is written to disk first, and only replaces the
    /// in-memory set if that succeeds. On error, both are left as they were.
    pub fn update(&mut self, name: &str, text: &str) -> Result<(), Error> {
        let mut set = self.set.clone();
        set.revisions.insert(
            name.to_string(),
            Revision {
                fingerprint: Some(self.fingerprint(text)),
                text: text.to_string(),
            },
        );
        set.last_updated = Some(Local::now());

        self.commit(set)?;
        log::debug!("updated revision for {}", name);

        Ok(())
    }

    /// Forgets every revision.
    ///
    /// As with [`Store::update`], the in-memory set is only cleared once the
    /// empty set has been written.
    pub fn delete_all(&mut self) -> Result<(), Error> {
        self.commit(RevisionSet::default())?;
        log::debug!("deleted all revisions from {}", self.path.display());

        Ok(())
    }

    fn commit(&mut self, set: RevisionSet) -> Result<(), Error> {
        set.save(&self.path).map_err(|e| {
            log::error!("cannot save revisions to {}: {}", self.path.display(), e);
            e
        })?;
        self.set = set;

        Ok(())
    }
}
