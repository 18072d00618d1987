//! The interactive check session: report whether an artifact changed, then
//! offer to update it, clear the revision file, and show either revision.

use std::io::{BufRead, Write};

use change_detector::Detector;
use revision_store::{Fingerprinter, Store};

pub(crate) const MSG_CHECK: &str = "Checking revision for artifact:";
pub(crate) const MSG_NOT_MODIFIED: &str = "Given artifact not modified since last revision.";
pub(crate) const MSG_MODIFIED: &str = "Given artifact was modified since last revision!";
pub(crate) const MSG_UPDATE: &str = "Starting update of artifact:";
pub(crate) const MSG_UPDATED: &str = "Artifact revision updated.";
pub(crate) const MSG_UPDATE_ERROR: &str = "Error updating artifact revision!";
pub(crate) const MSG_DELETE: &str = "Clearing revision file...";
pub(crate) const MSG_DELETED: &str = "All artifact revisions deleted.";
pub(crate) const MSG_DELETE_ERROR: &str = "Error deleting revisions!";

#[derive(Debug)]
pub(crate) struct Session<'a, F, R, W> {
    store: &'a mut Store<F>,
    input: R,
    output: W,
}

impl<'a, F, R, W> Session<'a, F, R, W>
where
    F: Fingerprinter,
    R: BufRead,
    W: Write,
{
    pub(crate) fn new(store: &'a mut Store<F>, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    pub(crate) fn run(&mut self, name: &str, observed: Option<&str>) -> anyhow::Result<()> {
        writeln!(self.output, "{} {}", MSG_CHECK, name)?;
        print_diff(&mut self.output, self.store, name, observed)?;

        if self.confirm("Update artifact's revision?")? {
            writeln!(self.output, "{} {}", MSG_UPDATE, name)?;
            match observed {
                Some(text) => print_status(
                    &mut self.output,
                    self.store.update(name, text),
                    MSG_UPDATED,
                    MSG_UPDATE_ERROR,
                )?,
                None => writeln!(self.output, "{}", MSG_UPDATE_ERROR)?,
            }
        }

        if self.confirm("Clean revision file now?")? {
            writeln!(self.output, "{}", MSG_DELETE)?;
            print_status(
                &mut self.output,
                self.store.delete_all(),
                MSG_DELETED,
                MSG_DELETE_ERROR,
            )?;
        }

        if self.confirm("Show old revision for artifact?")? {
            writeln!(self.output, "{}", Detector::new(self.store).show_old(name))?;
        }

        if self.confirm("Show new revision for artifact?")? {
            writeln!(self.output, "{}", Detector::new(self.store).show_new(observed))?;
        }

        Ok(())
    }

    /// Asks a yes/no question. Anything other than `y` is a no, including the
    /// end of the input.
    fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        write!(self.output, "{} [y/n]: ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        if answer.is_empty() {
            writeln!(self.output)?;
        }

        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Writes whether `name` changed and, if so, both revisions.
pub(crate) fn print_diff<F, W>(
    output: &mut W,
    store: &Store<F>,
    name: &str,
    observed: Option<&str>,
) -> anyhow::Result<()>
where
    F: Fingerprinter,
    W: Write,
{
    match Detector::new(store).diff(name, observed) {
        Some(diff) => {
            writeln!(output, "{}", MSG_MODIFIED)?;
            writeln!(output, "{}", diff.old)?;
            writeln!(output, "{}", diff.new)?;
        }
        None => writeln!(output, "{}", MSG_NOT_MODIFIED)?,
    }

    Ok(())
}

/// Writes `ok` or `failed` depending on `result`.
pub(crate) fn print_status<W, E>(
    output: &mut W,
    result: Result<(), E>,
    ok: &str,
    failed: &str,
) -> anyhow::Result<()>
where
    W: Write,
    E: std::fmt::Display,
{
    match result {
        Ok(()) => writeln!(output, "{}", ok)?,
        Err(e) => writeln!(output, "{} ({})", failed, e)?,
    }

    Ok(())
}
