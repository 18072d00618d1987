use std::{
    ffi::OsStr,
    fs,
    io::{self, Read},
    path::Path,
};

use thiserror::Error;

/// A `Source` provides the current text of an artifact.
pub(crate) trait Source {
    fn current_text(&self, artifact: &Path) -> Result<String, Error>;
}

/// Reads artifact text from the file system. The artifact `-` is read from
/// stdin.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FileSource;

impl Source for FileSource {
    fn current_text(&self, artifact: &Path) -> Result<String, Error> {
        if artifact.as_os_str() == OsStr::new("-") {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(Error::Stdin)?;
            return Ok(text);
        }

        fs::read_to_string(artifact).map_err(|err| Error::Read {
            err,
            artifact: artifact.display().to_string(),
        })
    }
}

/// Observes the current text of `artifact`.
///
/// An artifact that can't be read isn't fatal: it's reported as having no
/// text at all, which the detector treats as a change from any stored
/// revision.
pub(crate) fn observe<S>(source: &S, artifact: &Path) -> Option<String>
where
    S: Source + ?Sized,
{
    match source.current_text(artifact) {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("artifact is unavailable: {}", e);
            None
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("cannot read {artifact}: {err}")]
    Read { err: io::Error, artifact: String },

    #[error("cannot read from stdin: {0}")]
    Stdin(io::Error),
}
