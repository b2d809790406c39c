/// Creates a [TracedError](crate::TracedError) from a format string.
///
/// ```
/// let err = traced_error::format_err!("code {}", 42);
/// assert_eq!(err.to_string(), "code 42");
/// ```
#[macro_export]
macro_rules! format_err {
    ($($arg:tt)*) => {
        $crate::new(::std::format!($($arg)*))
    };
}

/// Wraps an error with a formatted message, see [wrap](crate::wrap).
///
/// ```
/// let err = traced_error::wrap_err!(std::io::Error::other("refused"), "connecting to {}", "db");
/// assert_eq!(err.to_string(), "connecting to db: refused");
/// ```
#[macro_export]
macro_rules! wrap_err {
    ($error:expr, $($arg:tt)*) => {
        $crate::wrap($error, ::std::format!($($arg)*))
    };
}
