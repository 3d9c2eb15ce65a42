//! Grepable error codes shared by every domain error.

/// Stable machine-readable code for an error, e.g. `E_FORM_NOT_FOUND`.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
