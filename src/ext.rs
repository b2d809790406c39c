use core::error::Error;
use core::fmt::Display;

use crate::TracedError;

/// Adds stack traces and messages to the error of a [Result].
///
/// `Ok` values pass through untouched.
///
/// ```
/// use traced_error::ResultExt;
///
/// fn read(path: &str) -> Result<String, traced_error::TracedError> {
///     std::fs::read_to_string(path).wrap_err_with(|| format!("reading {path}"))
/// }
///
/// let err = read("/does/not/exist").unwrap_err();
/// assert!(err.to_string().starts_with("reading /does/not/exist: "));
/// ```
pub trait ResultExt<T, E> {
    /// See [with_stack](crate::with_stack).
    fn with_stack(self) -> Result<T, TracedError>;

    /// See [wrap](crate::wrap).
    fn wrap_err<M>(self, message: M) -> Result<T, TracedError>
    where
        M: Display;

    /// Like [ResultExt::wrap_err], building the message only on error.
    fn wrap_err_with<M, F>(self, message: F) -> Result<T, TracedError>
    where
        M: Display,
        F: FnOnce() -> M;

    /// See [with_message](crate::with_message).
    fn with_message<M>(self, message: M) -> Result<T, TracedError>
    where
        M: Display;
}

impl<T, E> ResultExt<T, E> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn with_stack(self) -> Result<T, TracedError> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(crate::with_stack(error)),
        }
    }

    #[track_caller]
    fn wrap_err<M>(self, message: M) -> Result<T, TracedError>
    where
        M: Display,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(crate::wrap(error, message)),
        }
    }

    #[track_caller]
    fn wrap_err_with<M, F>(self, message: F) -> Result<T, TracedError>
    where
        M: Display,
        F: FnOnce() -> M,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(crate::wrap(error, message())),
        }
    }

    #[track_caller]
    fn with_message<M>(self, message: M) -> Result<T, TracedError>
    where
        M: Display,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(crate::with_message(error, message)),
        }
    }
}
