//! Derive macro for `traced_error::StackTracer`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attr;
mod expand;

/// Implements `traced_error::StackTracer` for a struct or an enum.
///
/// Each struct, and each enum variant, names up to two fields:
///
/// - the recorded trace: marked `#[stack_trace]`, or a field named `stack_trace`.
///   Its type must be `traced_error::StackTrace`.
/// - the next link: marked `#[source]`, or a field named `source`, whose type implements
///   `StackTracer` (directly or behind a `Box`). Mark it `#[traced(end)]` instead when it is
///   a plain `core::error::Error`; the chain then continues through `Error::source`.
///
/// At least one of the two must be present.
///
/// The derive also implements `From<Type> for traced_error::TracedError` (for types that are
/// `Send + Sync + 'static`), so `?` keeps the trace the value already holds.
///
/// ```
/// use thiserror::Error;
/// use traced_error::{StackTrace, StackTracer, StackTracerExt};
///
/// #[derive(Debug, Error, StackTracer)]
/// #[error("config could not be read")]
/// struct ConfigError {
///     #[traced(end)]
///     #[source]
///     io: std::io::Error,
///     stack_trace: StackTrace,
/// }
///
/// let err = ConfigError {
///     io: std::io::Error::other("permission denied"),
///     stack_trace: StackTrace::capture(),
/// };
/// assert_eq!(err.stack_trace().location().line(), line!() - 2);
///
/// let origin = err.stack_trace().clone();
/// let err = traced_error::TracedError::from(err);
/// assert_eq!(err.stack_trace(), &origin);
/// ```
///
/// A type with neither field is rejected:
///
/// ```compile_fail
/// use traced_error::StackTracer;
///
/// #[derive(Debug, StackTracer)]
/// struct Nothing {
///     message: String,
/// }
/// # impl core::fmt::Display for Nothing {
/// #     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { f.write_str("nothing") }
/// # }
/// # impl core::error::Error for Nothing {}
/// # fn main() {}
/// ```
///
/// So are two next links:
///
/// ```compile_fail
/// use traced_error::{StackTrace, StackTracer};
///
/// #[derive(Debug, StackTracer)]
/// struct Twice {
///     #[traced(end)]
///     first: std::io::Error,
///     #[traced(end)]
///     second: std::io::Error,
///     stack_trace: StackTrace,
/// }
/// # impl core::fmt::Display for Twice {
/// #     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { f.write_str("twice") }
/// # }
/// # impl core::error::Error for Twice {}
/// # fn main() {}
/// ```
///
/// Unknown `#[traced(..)]` arguments:
///
/// ```compile_fail
/// use traced_error::{StackTrace, StackTracer};
///
/// #[derive(Debug, StackTracer)]
/// struct Typo {
///     #[traced(std)]
///     io: std::io::Error,
///     stack_trace: StackTrace,
/// }
/// # impl core::fmt::Display for Typo {
/// #     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { f.write_str("typo") }
/// # }
/// # impl core::error::Error for Typo {}
/// # fn main() {}
/// ```
///
/// And a `#[source]` that does not implement `StackTracer`:
///
/// ```compile_fail
/// use traced_error::{StackTrace, StackTracer};
///
/// #[derive(Debug, StackTracer)]
/// struct Plain {
///     #[source]
///     io: std::io::Error,
///     stack_trace: StackTrace,
/// }
/// # impl core::fmt::Display for Plain {
/// #     fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { f.write_str("plain") }
/// # }
/// # impl core::error::Error for Plain {}
/// # fn main() {}
/// ```
#[proc_macro_derive(StackTracer, attributes(source, stack_trace, traced))]
pub fn derive_stack_tracer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand::derive(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.into_compile_error().into(),
    }
}
