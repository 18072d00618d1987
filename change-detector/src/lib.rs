//! Change detection between the stored revision of an artifact and the text
//! currently observed for it.

use revision_store::{Fingerprint, Fingerprinter, Store};

mod report;
pub use report::{Diff, Report, TIME_FORMAT};

/// One side of a comparison: a fingerprint and text, either of which may be
/// absent.
///
/// An absent text is not the same as an empty text: the former means there is
/// no revision at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub fingerprint: Option<Fingerprint>,
    pub text: Option<&'a str>,
}

/// Whether the store has a revision for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Untracked,
    Tracked,
}

/// Checks if two snapshots represent the same revision.
///
/// Matching fingerprints are always considered similar, even if the texts
/// differ. When the fingerprints differ, the texts decide: a revision written
/// with a different fingerprinter is still similar if its text is unchanged.
pub fn is_similar(old: Snapshot<'_>, new: Snapshot<'_>) -> bool {
    new.fingerprint == old.fingerprint || new.text == old.text
}

/// A `Detector` compares observed artifact text against the revisions held in
/// a [`Store`].
#[derive(Debug)]
pub struct Detector<'a, F> {
    store: &'a Store<F>,
}

impl<'a, F> Detector<'a, F>
where
    F: Fingerprinter,
{
    pub fn new(store: &'a Store<F>) -> Self {
        Self { store }
    }

    pub fn status(&self, name: &str) -> Status {
        match self.store.get(name) {
            Some(_) => Status::Tracked,
            None => Status::Untracked,
        }
    }

    /// Returns the stored snapshot for `name`.
    pub fn stored(&self, name: &str) -> Snapshot<'a> {
        let (fingerprint, text) = self.store.stored(name);
        Snapshot { fingerprint, text }
    }

    /// Fingerprints the observed text. `None` means the artifact currently has
    /// no text at all.
    pub fn observe<'b>(&self, observed: Option<&'b str>) -> Snapshot<'b> {
        Snapshot {
            fingerprint: observed.map(|text| self.store.fingerprint(text)),
            text: observed,
        }
    }

    /// Compares the stored revision of `name` against the observed text.
    ///
    /// Returns `None` if the artifact is unchanged, otherwise the reports for
    /// both revisions.
    pub fn diff(&self, name: &str, observed: Option<&str>) -> Option<Diff> {
        let old = self.stored(name);
        let new = self.observe(observed);

        if is_similar(old, new) {
            log::debug!("{} is unchanged", name);
            return None;
        }

        log::debug!(
            "{} has changed: {:?} -> {:?}",
            name,
            old.fingerprint,
            new.fingerprint
        );
        Some(Diff {
            old: self.old_report(old),
            new: new_report(new),
        })
    }

    /// Reports the stored revision of `name`.
    pub fn show_old(&self, name: &str) -> Report {
        self.old_report(self.stored(name))
    }

    /// Reports the observed text, regardless of what is stored.
    pub fn show_new(&self, observed: Option<&str>) -> Report {
        new_report(self.observe(observed))
    }

    fn old_report(&self, old: Snapshot<'_>) -> Report {
        Report::Old {
            last_updated: self.store.last_updated().copied(),
            fingerprint: old.fingerprint,
            text: old.text.map(String::from),
        }
    }
}

fn new_report(new: Snapshot<'_>) -> Report {
    Report::New {
        fingerprint: new.fingerprint,
        text: new.text.map(String::from),
    }
}
