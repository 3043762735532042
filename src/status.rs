//! Response status classification.

/// How a response status is displayed and whether it counts as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusOutcome {
    status: u16,
    display: String,
    is_error: bool,
}

impl StatusOutcome {
    /// The status as it should be recorded on the span.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether the status was classified as an error.
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// The status that was classified, `0` if none was observed.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Error message recorded on the span: `"<display>: <reason phrase>"`.
    ///
    /// The reason phrase is empty for codes without a standard one.
    pub fn error_message(&self) -> String {
        format!("{}: {}", self.display, status_text(self.status))
    }
}

/// Classifies a response status with the given error predicate.
///
/// A status of `0` means no status was ever set. It is reported as `"0"` and
/// flagged only when the predicate explicitly treats `0` as an error;
/// otherwise it is reported as a successful `"200"`.
///
/// ## Example
///
/// ```rust
/// use httptrace::{classify_status, is_server_error};
///
/// let outcome = classify_status(503, &is_server_error);
/// assert_eq!(outcome.display(), "503");
/// assert!(outcome.is_error());
/// assert_eq!(outcome.error_message(), "503: Service Unavailable");
///
/// let outcome = classify_status(0, &is_server_error);
/// assert_eq!(outcome.display(), "200");
/// assert!(!outcome.is_error());
/// ```
pub fn classify_status<F>(status: u16, is_error: &F) -> StatusOutcome
where
    F: Fn(u16) -> bool + ?Sized,
{
    let flagged = is_error(status);
    let display = match (status, flagged) {
        (0, true) => "0".to_string(),
        (0, false) => "200".to_string(),
        (code, _) => code.to_string(),
    };
    StatusOutcome {
        status,
        display,
        is_error: flagged,
    }
}

/// The default error predicate: any 5xx status.
pub fn is_server_error(status: u16) -> bool {
    (500..600).contains(&status)
}

/// The standard reason phrase for a status code, or `""` when there is none.
pub fn status_text(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or_default()
}
