/// Error context for every fallible operation in the crate.
///
/// Errors travel as `error_stack::Report<SimplifyError>`; the variant says
/// which class of failure happened and printable attachments carry the
/// offending values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimplifyError {
    /// The point sequence (or a derived signal) cannot be processed.
    #[error("invalid input")]
    InvalidInput,

    /// A tolerance, window parameter or numeric option is out of range.
    #[error("invalid parameter")]
    InvalidParameter,

    /// Reading or writing a file failed.
    #[error("i/o failure")]
    Io,

    /// A CSV row or JSON document could not be parsed.
    #[error("parse failure")]
    Parse,
}

pub type Result<T> = error_stack::Result<T, SimplifyError>;
