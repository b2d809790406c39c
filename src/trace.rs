//! Stack capture.
//!
//! A [StackTrace] is taken once, when an error is built, and never changes afterwards.
//! Where the frames come from is decided by a [FrameSource]: [Backtraced] walks the
//! real call stack, while tests can hand in any `Fn() -> Vec<Frame>`.

use core::fmt;
use core::panic::Location;
use std::path::{Path, PathBuf};

/// A single resolved call-site frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    function: Option<String>,
    file: Option<PathBuf>,
    line: Option<u32>,
}

impl Frame {
    /// Creates a frame from its parts.
    pub fn new(function: Option<String>, file: Option<PathBuf>, line: Option<u32>) -> Self {
        Self {
            function,
            file,
            line,
        }
    }

    /// Demangled function name, without the trailing hash.
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Source file of the frame.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Line number within [Frame::file].
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function().unwrap_or("<unknown>"))?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "\n\t{}:{}", file.display(), line),
            (Some(file), None) => write!(f, "\n\t{}", file.display()),
            _ => Ok(()),
        }
    }
}

/// Produces the frames of the current call stack.
pub trait FrameSource {
    /// Captures the frames, innermost first.
    fn frames(&self) -> Vec<Frame>;
}

impl<F> FrameSource for F
where
    F: Fn() -> Vec<Frame>,
{
    fn frames(&self) -> Vec<Frame> {
        self()
    }
}

/// [FrameSource] backed by the `backtrace` crate.
///
/// Symbols are resolved right away. Frames belonging to the `backtrace` crate itself are
/// dropped from the top of the stack.
#[cfg(feature = "backtrace")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtraced;

#[cfg(feature = "backtrace")]
impl FrameSource for Backtraced {
    fn frames(&self) -> Vec<Frame> {
        let backtrace = backtrace::Backtrace::new();
        backtrace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .map(|symbol| Frame {
                function: symbol.name().map(|name| format!("{name:#}")),
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
            })
            .skip_while(|frame| {
                frame
                    .function()
                    .is_none_or(|name| name.starts_with("backtrace::"))
            })
            .collect()
    }
}

/// Fallback used without the `backtrace` feature: no frames, only the location.
#[cfg(not(feature = "backtrace"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtraced;

#[cfg(not(feature = "backtrace"))]
impl FrameSource for Backtraced {
    fn frames(&self) -> Vec<Frame> {
        Vec::new()
    }
}

/// Call stack recorded when an error was created.
#[derive(Debug, Clone, PartialEq)]
pub struct StackTrace {
    location: &'static Location<'static>,
    frames: Vec<Frame>,
}

impl StackTrace {
    /// Captures the current call stack with [Backtraced].
    #[track_caller]
    pub fn capture() -> Self {
        Self::capture_from(&Backtraced)
    }

    /// Captures the current call stack with the given source.
    #[track_caller]
    pub fn capture_from<S>(source: &S) -> Self
    where
        S: FrameSource + ?Sized,
    {
        let location = Location::caller();
        let frames = source.frames();
        tracing::trace!(%location, frames = frames.len(), "captured stack trace");
        Self { location, frames }
    }

    /// Where the capturing constructor was called.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Captured frames, innermost first. Empty when no frames could be resolved.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return write!(f, "at {}", self.location);
        }

        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{frame}")?;
        }
        Ok(())
    }
}
