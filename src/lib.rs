#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use core::error::Error;
use core::panic::Location;

pub use traced_error_derive::StackTracer;

mod error;
mod ext;
mod macros;
#[doc(hidden)]
pub mod private;
pub mod trace;

pub use error::{TracedError, cause, new, traced, with_message, with_stack, wrap};
pub use ext::ResultExt;
pub use trace::{Frame, FrameSource, StackTrace};

/// One link in a chain of errors.
#[derive(Debug, Clone, Copy)]
pub enum Chain<'a> {
    /// A link that may hold a recorded [StackTrace] and knows its next link.
    Traced(&'a dyn StackTracer),
    /// A plain [core::error::Error]. The chain continues through [Error::source].
    Std(&'a (dyn Error + 'static)),
}

impl<'a> Chain<'a> {
    /// Wraps a plain error, promoting it to [Chain::Traced] when it is a [TracedError] or a
    /// `Box<TracedError>`.
    pub fn from_dyn(error: &'a (dyn Error + 'static)) -> Self {
        if let Some(traced) = error.downcast_ref::<TracedError>() {
            return Chain::Traced(traced);
        }
        match error.downcast_ref::<Box<TracedError>>() {
            Some(boxed) => Chain::Traced(&**boxed),
            None => Chain::Std(error),
        }
    }

    /// Returns the lower-level link.
    pub fn next(&self) -> Option<Chain<'a>> {
        match *self {
            Chain::Traced(tracer) => tracer.next(),
            Chain::Std(error) => error.source().map(Chain::from_dyn),
        }
    }

    /// Returns the error of this link.
    pub fn inner(&self) -> &'a dyn Error {
        match *self {
            Chain::Traced(tracer) => tracer,
            Chain::Std(error) => error,
        }
    }

    /// Returns the stack trace recorded by this link itself.
    pub fn recorded(&self) -> Option<&'a StackTrace> {
        match *self {
            Chain::Traced(tracer) => tracer.recorded(),
            Chain::Std(_) => None,
        }
    }

    /// Returns where this link recorded its stack trace.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        self.recorded().map(StackTrace::location)
    }

    /// Returns the first link, starting with this one, that holds a stack trace.
    pub fn holder(self) -> Option<Chain<'a>> {
        self.into_iter().find(|link| link.recorded().is_some())
    }

    /// Returns the first stack trace found from this link downwards.
    pub fn find_stack_trace(self) -> Option<&'a StackTrace> {
        self.into_iter().find_map(|link| link.recorded())
    }
}

impl core::fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{}, at {}", self.inner(), location),
            None => core::fmt::Display::fmt(self.inner(), f),
        }
    }
}

impl<'a, E> From<&'a E> for Chain<'a>
where
    E: StackTracer + Sized,
{
    fn from(tracer: &'a E) -> Self {
        Chain::Traced(tracer)
    }
}

impl<'a> IntoIterator for Chain<'a> {
    type Item = Chain<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        Iter { chain: Some(self) }
    }
}

/// Error types that take part in a traced cause chain.
///
/// Usually derived with [`#[derive(StackTracer)]`](derive@StackTracer).
pub trait StackTracer: Error {
    /// Returns the stack trace recorded by this error itself, if it recorded one.
    fn recorded(&self) -> Option<&StackTrace>;
    /// Returns the next link in the chain.
    fn next<'a>(&'a self) -> Option<Chain<'a>>;
}

/// Iterator over the links of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    chain: Option<Chain<'a>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Chain<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.chain.take()?;
        self.chain = link.next();
        Some(link)
    }
}

/// Returned when no link of a chain holds a stack trace.
#[derive(Debug, thiserror::Error)]
#[error("no stack trace recorded in the cause chain of `{error}`")]
pub struct MissingStackTrace {
    error: String,
}

/// Finds the first stack trace in the chain starting at `error`.
pub fn find_stack_trace<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a StackTrace> {
    Chain::from_dyn(error).find_stack_trace()
}

/// Helper for displaying every link of a chain.
#[derive(Debug, Clone)]
pub struct ChainWriter<'a> {
    chain: Chain<'a>,
}

impl core::fmt::Display for ChainWriter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, link) in self.chain.into_iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{i}: {link}")?;
        }
        Ok(())
    }
}

/// Convenience helpers for types implementing [StackTracer].
pub trait StackTracerExt: StackTracer + Sized {
    /// Iterates over this error and its causes.
    fn chain(&self) -> Iter<'_> {
        Chain::from(self).into_iter()
    }

    /// Returns the first stack trace recorded in the chain.
    fn try_stack_trace(&self) -> Result<&StackTrace, MissingStackTrace> {
        Chain::from(self)
            .find_stack_trace()
            .ok_or_else(|| MissingStackTrace {
                error: self.to_string(),
            })
    }

    /// Returns the first stack trace recorded in the chain.
    ///
    /// # Panics
    ///
    /// When no link records one. Errors built by this crate always carry a trace, so this
    /// only happens for hand-written [StackTracer] chains.
    fn stack_trace(&self) -> &StackTrace {
        match self.try_stack_trace() {
            Ok(trace) => trace,
            Err(missing) => {
                tracing::error!(error = %missing, "stack trace invariant violated");
                panic!("{missing}")
            }
        }
    }

    /// Returns a [ChainWriter] printing one line per link.
    ///
    /// ```text
    /// 0: loading config: not found, at src/main.rs:20:5
    /// 1: not found
    /// ```
    fn to_chain(&self) -> ChainWriter<'_> {
        ChainWriter {
            chain: Chain::from(self),
        }
    }

    /// Converts into a [TracedError], keeping the existing trace or capturing one here.
    #[track_caller]
    fn into_traced(self) -> TracedError
    where
        Self: Send + Sync + 'static,
    {
        TracedError::adopt(error::Cause::traced(self))
    }

    /// Adds a message, with the same rules as [with_message].
    #[track_caller]
    fn context<M>(self, message: M) -> TracedError
    where
        Self: Send + Sync + 'static,
        M: core::fmt::Display,
    {
        TracedError::annotate(error::Cause::traced(self), message.to_string())
    }
}

impl<E: StackTracer> StackTracerExt for E {}
