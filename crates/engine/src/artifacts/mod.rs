mod atomic_io;
mod fingerprint;
mod macro_text;
mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use fingerprint::course_fingerprint;
pub use macro_text::{parse_macro_text, render_macro_text, MacroParseError};
pub use report::{write_macro, write_report, RunReport};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
