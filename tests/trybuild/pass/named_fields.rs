use traced_error::{StackTrace, StackTracer};

#[derive(Debug, StackTracer)]
struct ReadError {
    #[traced(end)]
    source: std::io::Error,
    stack_trace: StackTrace,
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "read failed")
    }
}

impl core::error::Error for ReadError {}

fn main() {
    let err = ReadError {
        source: std::io::Error::other("oh"),
        stack_trace: StackTrace::capture(),
    };
    assert!(err.recorded().is_some());
    assert!(err.next().is_some());
}
