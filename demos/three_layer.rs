use thiserror::Error;
use traced_error::{StackTrace, StackTracer, StackTracerExt};

#[derive(Debug, Error, StackTracer)]
#[error("leaf layer failed")]
struct LeafError {
    #[traced(end)]
    #[source]
    cause: std::io::Error,
    stack_trace: StackTrace,
}

impl LeafError {
    #[track_caller]
    fn new() -> Self {
        Self {
            cause: std::io::Error::other("leaf exploded"),
            stack_trace: StackTrace::capture(),
        }
    }
}

#[derive(Debug, Error, StackTracer)]
#[error("middle layer failed")]
struct MiddleError {
    #[source]
    source: LeafError,
}

#[derive(Debug, Error, StackTracer)]
#[error("top layer failed")]
struct TopError {
    #[source]
    source: MiddleError,
    stack_trace: StackTrace,
}

impl TopError {
    #[track_caller]
    fn new() -> Self {
        Self {
            source: MiddleError {
                source: LeafError::new(),
            },
            stack_trace: StackTrace::capture(),
        }
    }
}

fn main() {
    let error = TopError::new();

    println!("Display: {error}");
    println!("traced-error links:");
    println!("{}", error.to_chain());

    println!("std::error::Error chain:");
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&error);
    let mut depth = 0;
    while let Some(err) = current.take() {
        println!("  {depth}: {err}");
        depth += 1;
        current = err.source();
    }

    let error = error.context("handling request");
    println!("\nAfter context: {error}");
    println!("{}", error.stack_trace());
}
