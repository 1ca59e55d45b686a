use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that abort an export run.
///
/// Conditions that only cause an element or marker to be skipped are not
/// errors; they surface as `None` and a debug log line.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no '{0}' layer found")]
    MissingLayer(String),

    #[error("group {} has no child elements", .id.as_deref().unwrap_or("<unnamed>"))]
    EmptyGroup { id: Option<String> },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("invalid number '{value}' in {context}")]
    InvalidNumber { value: String, context: String },

    #[error("malformed transform '{0}'")]
    MalformedTransform(String),

    #[error("cannot read start point from path data '{0}'")]
    MalformedPath(String),

    #[error("export id '{0}' is not a plain file name")]
    InvalidExportId(String),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' failed ({status}): {stderr}")]
    ExternalTool {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Parse a decimal number, reporting where it came from on failure
pub(crate) fn parse_number(value: &str, context: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ExportError::InvalidNumber {
            value: value.to_string(),
            context: context.to_string(),
        })
}
