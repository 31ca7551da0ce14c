use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeysprintError>;

#[derive(Debug, Error)]
pub enum KeysprintError {
    /// A surface the typing test cannot work without was not provided.
    #[error("missing required surface: {0}")]
    MissingSurface(&'static str),

    #[error("cannot read paragraph list {}: {source}", path.display())]
    ParagraphSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed paragraph list: {0}")]
    ParagraphFormat(#[from] serde_json::Error),

    #[error("bundled paragraph list not found: {0}")]
    MissingBundledList(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),
}
