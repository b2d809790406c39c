use traced_error::{StackTrace, StackTracer};

#[derive(Debug, StackTracer)]
struct Leaf(#[stack_trace] StackTrace);

impl core::fmt::Display for Leaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "leaf")
    }
}

impl core::error::Error for Leaf {}

#[derive(Debug, StackTracer)]
struct Wrapper(#[source] Leaf);

impl core::fmt::Display for Wrapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "wrapper")
    }
}

impl core::error::Error for Wrapper {}

fn main() {
    let err = Wrapper(Leaf(StackTrace::capture()));
    assert!(err.recorded().is_none());
    assert!(err.next().and_then(|link| link.recorded()).is_some());
}
