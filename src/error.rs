use thiserror::Error;

/// Message shown when the catalog cannot be loaded at session start.
pub const OFFLINE_MESSAGE: &str = "Backend offline. Start the refinement service first.";

/// Errors surfaced by the refinement client.
///
/// Every variant is local and non-fatal: its `Display` output is the inline
/// message shown next to the control that triggered it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RefinerError {
    /// Prompt was empty or whitespace-only; no request was sent.
    #[error("Enter a prompt.")]
    EmptyPrompt,
    /// Clipboard held no text after trimming.
    #[error("Clipboard empty.")]
    EmptyClipboard,
    /// The system clipboard could not be opened, read or written.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
    /// The page had no selection or readable field.
    #[error("No text found.")]
    NoTextFound,
    /// The page refused script execution (privileged or closed).
    #[error("Cannot access page.")]
    PageAccessDenied,
    /// Transport-level failure reaching the service.
    #[error("{0}")]
    ServiceUnreachable(String),
    /// The service answered with a non-success status.
    #[error("{}", request_failed_message(.status, .detail))]
    RequestFailed { status: u16, detail: Option<String> },
    /// Injection found no editable field to write into.
    #[error("No editable field found on the page.")]
    NoTarget,
    /// An id that the loaded catalog does not offer.
    #[error("Unknown {kind}: {id}")]
    UnknownOption { kind: &'static str, id: String },
    /// A flow or action that needs the catalog ran while offline.
    #[error("{}", OFFLINE_MESSAGE)]
    Offline,
    /// A success response whose body did not match the expected shape.
    #[error("Response decode error: {0}")]
    Decode(String),
    /// Settings or handoff files could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

fn request_failed_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => detail.to_string(),
        _ => format!("Error {status}"),
    }
}

impl From<reqwest::Error> for RefinerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return RefinerError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => RefinerError::RequestFailed {
                status: status.as_u16(),
                detail: None,
            },
            None => RefinerError::ServiceUnreachable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RefinerError {
    fn from(err: serde_json::Error) -> Self {
        RefinerError::Decode(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

impl From<std::io::Error> for RefinerError {
    fn from(err: std::io::Error) -> Self {
        RefinerError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_failure_is_not_a_storage_error() {
        let err = RefinerError::ClipboardUnavailable("no display server".into());
        assert_eq!(err.to_string(), "Clipboard unavailable: no display server");
    }

    #[test]
    fn request_failed_prefers_detail() {
        let err = RefinerError::RequestFailed {
            status: 502,
            detail: Some("Cannot connect to Ollama.".to_string()),
        };
        assert_eq!(err.to_string(), "Cannot connect to Ollama.");
    }

    #[test]
    fn request_failed_without_detail_uses_status() {
        let err = RefinerError::RequestFailed {
            status: 500,
            detail: None,
        };
        assert_eq!(err.to_string(), "Error 500");

        let blank = RefinerError::RequestFailed {
            status: 404,
            detail: Some(String::new()),
        };
        assert_eq!(blank.to_string(), "Error 404");
    }

    #[test]
    fn unreachable_surfaces_raised_message() {
        let err = RefinerError::ServiceUnreachable("connection refused".into());
        assert_eq!(err.to_string(), "connection refused");
    }
}
