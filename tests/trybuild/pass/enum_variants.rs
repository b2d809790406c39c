use thiserror::Error;
use traced_error::{StackTrace, StackTracer, TracedError};

#[derive(Debug, Error, StackTracer)]
enum StoreError {
    #[error("not found")]
    NotFound { stack_trace: StackTrace },
    #[error("io")]
    Io {
        #[traced(end)]
        #[source]
        io: std::io::Error,
        #[stack_trace]
        at: StackTrace,
    },
    #[error("other")]
    Other(#[traced(end)] TracedError),
}

fn main() {
    let not_found = StoreError::NotFound {
        stack_trace: StackTrace::capture(),
    };
    assert!(not_found.next().is_none());

    let io = StoreError::Io {
        io: std::io::Error::other("oh"),
        at: StackTrace::capture(),
    };
    assert!(io.recorded().is_some());

    let other = StoreError::Other(traced_error::new("other"));
    assert!(other.recorded().is_none());
}
