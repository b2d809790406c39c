//! The decorated error type and its constructors.

use core::error::Error;
use core::fmt;

use crate::{Chain, StackTrace, StackTracer, StackTracerExt};

type BoxError = Box<dyn Error + Send + Sync + 'static>;
type BoxTracer = Box<dyn StackTracer + Send + Sync + 'static>;

/// The error a [TracedError] wraps.
pub(crate) enum Cause {
    Traced(BoxTracer),
    Std(BoxError),
}

impl Cause {
    /// Boxes `error`, keeping a [TracedError] visible as a traced link.
    pub(crate) fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        match downcast_traced(Box::new(error)) {
            Ok(traced) => Cause::Traced(traced),
            Err(error) => Cause::Std(error),
        }
    }

    pub(crate) fn traced<T>(tracer: T) -> Self
    where
        T: StackTracer + Send + Sync + 'static,
    {
        Cause::Traced(Box::new(tracer))
    }

    fn chain(&self) -> Chain<'_> {
        match self {
            Cause::Traced(tracer) => Chain::Traced(&**tracer),
            Cause::Std(error) => Chain::from_dyn(&**error),
        }
    }

    fn as_error(&self) -> &(dyn Error + 'static) {
        match self {
            Cause::Traced(tracer) => &**tracer,
            Cause::Std(error) => &**error,
        }
    }
}

/// Recovers a [TracedError] from a boxed error, looking through one extra `Box`.
fn downcast_traced(error: BoxError) -> Result<Box<TracedError>, BoxError> {
    let error = match error.downcast::<TracedError>() {
        Ok(traced) => return Ok(traced),
        Err(error) => error,
    };
    error.downcast::<Box<TracedError>>().map(|boxed| *boxed)
}

enum Repr {
    /// Root error built from a message.
    Message { message: String, trace: StackTrace },
    /// A trace added on top of an existing error.
    Stack { cause: Cause, trace: StackTrace },
    /// A message added on top of an error that already has a trace in its chain.
    Annotated { cause: Cause, message: String },
    /// An error whose chain already has a trace, taken as is.
    Adopted { cause: Cause },
}

/// An error that always has a [StackTrace] somewhere in its cause chain.
///
/// Built with [new], [with_stack], [wrap], [with_message], [traced], the
/// [format_err!](crate::format_err) and [wrap_err!](crate::wrap_err) macros, or
/// [ResultExt](crate::ResultExt).
pub struct TracedError {
    repr: Box<Repr>,
}

impl TracedError {
    fn from_repr(repr: Repr) -> Self {
        Self {
            repr: Box::new(repr),
        }
    }

    #[track_caller]
    pub(crate) fn message(message: String) -> Self {
        Self::from_repr(Repr::Message {
            message,
            trace: StackTrace::capture(),
        })
    }

    #[track_caller]
    pub(crate) fn stacked(cause: Cause) -> Self {
        Self::from_repr(Repr::Stack {
            cause,
            trace: StackTrace::capture(),
        })
    }

    /// Adds `message`, capturing a trace only when `cause` has none yet.
    #[track_caller]
    pub(crate) fn annotate(cause: Cause, message: String) -> Self {
        let existing = cause.chain().find_stack_trace().map(StackTrace::location);
        let cause = match existing {
            Some(location) => {
                tracing::debug!(%location, "keeping stack trace found in cause chain");
                cause
            }
            None => {
                tracing::debug!("no stack trace in cause chain, capturing one");
                Cause::traced(Self::stacked(cause))
            }
        };
        Self::from_repr(Repr::Annotated { cause, message })
    }

    /// Takes `cause` as is when it has a trace, otherwise adds one.
    #[track_caller]
    pub(crate) fn adopt(cause: Cause) -> Self {
        if cause.chain().find_stack_trace().is_some() {
            Self::from_repr(Repr::Adopted { cause })
        } else {
            Self::stacked(cause)
        }
    }

    fn cause_ref(&self) -> Option<&Cause> {
        match &*self.repr {
            Repr::Message { .. } => None,
            Repr::Stack { cause, .. }
            | Repr::Annotated { cause, .. }
            | Repr::Adopted { cause } => Some(cause),
        }
    }

    /// Returns the stack trace recorded for this error.
    ///
    /// This is the trace of the first link of the chain that recorded one. Adding a message
    /// with [with_message] never replaces it.
    pub fn stack_trace(&self) -> &StackTrace {
        StackTracerExt::stack_trace(self)
    }

    /// Returns the error wrapped by this one, if any.
    pub fn cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause_ref().map(Cause::as_error)
    }

    /// Returns the deepest error of the chain.
    pub fn root_cause(&self) -> &(dyn Error + 'static) {
        cause(self)
    }
}

impl StackTracer for TracedError {
    fn recorded(&self) -> Option<&StackTrace> {
        match &*self.repr {
            Repr::Message { trace, .. } | Repr::Stack { trace, .. } => Some(trace),
            Repr::Annotated { .. } | Repr::Adopted { .. } => None,
        }
    }

    fn next<'a>(&'a self) -> Option<Chain<'a>> {
        self.cause_ref().map(Cause::chain)
    }
}

impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.repr {
            Repr::Message { message, .. } => f.write_str(message),
            Repr::Stack { cause, .. } | Repr::Adopted { cause } => {
                fmt::Display::fmt(cause.as_error(), f)
            }
            Repr::Annotated { cause, message } => write!(f, "{}: {}", message, cause.as_error()),
        }
    }
}

impl fmt::Debug for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")?;
        if let Some(trace) = Chain::from(self).find_stack_trace() {
            write!(f, "\n\nStack trace:\n{trace}")?;
        }
        Ok(())
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause()
    }
}

/// Creates an error from a message, recording the stack trace here.
#[track_caller]
pub fn new<M>(message: M) -> TracedError
where
    M: fmt::Display,
{
    TracedError::message(message.to_string())
}

/// Records the stack trace here on top of `error`. The message is unchanged.
///
/// A trace is captured even when `error` already has one; use [with_message] to keep the
/// original.
///
/// `error` is seen through [Error] only, so a [TracedError] (or a `Box` of one) is recognized
/// as traced but other [StackTracer](crate::StackTracer) types are not. Convert those with
/// `TracedError::from` or [StackTracerExt::into_traced] first.
#[track_caller]
pub fn with_stack<E>(error: E) -> TracedError
where
    E: Error + Send + Sync + 'static,
{
    TracedError::stacked(Cause::new(error))
}

/// Records the stack trace here and prefixes the message of `error` with `message`.
#[track_caller]
pub fn wrap<E, M>(error: E, message: M) -> TracedError
where
    E: Error + Send + Sync + 'static,
    M: fmt::Display,
{
    let stacked = TracedError::stacked(Cause::new(error));
    TracedError::from_repr(Repr::Annotated {
        cause: Cause::traced(stacked),
        message: message.to_string(),
    })
}

/// Prefixes the message of `error` with `message`.
///
/// If a stack trace already exists anywhere in the chain of `error` it is kept, so the
/// reported call site stays the one where the error was first created. Otherwise the stack
/// trace is recorded here.
///
/// The chain is walked through [Error::source]. A trace held in a field of a derived
/// [StackTracer](crate::StackTracer) type is not visible that way; call
/// [StackTracerExt::context] on such errors, or convert them with `TracedError::from`.
#[track_caller]
pub fn with_message<E, M>(error: E, message: M) -> TracedError
where
    E: Error + Send + Sync + 'static,
    M: fmt::Display,
{
    TracedError::annotate(Cause::new(error), message.to_string())
}

/// Ensures `error` carries a stack trace.
///
/// `None` stays `None`. A [TracedError], boxed or not, is returned unchanged; any other error
/// gets the stack trace recorded here. Derived [StackTracer](crate::StackTracer) types count
/// as plain errors; use [StackTracerExt::into_traced] to keep their trace.
#[track_caller]
pub fn traced<E>(error: Option<E>) -> Option<TracedError>
where
    E: Error + Send + Sync + 'static,
{
    let traced = match downcast_traced(Box::new(error?)) {
        Ok(traced) => *traced,
        Err(error) => TracedError::stacked(Cause::Std(error)),
    };
    Some(traced)
}

/// Returns the deepest cause of `error`, following [Error::source], or `error` itself.
pub fn cause<'a>(error: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = error;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}
