use traced_error::{StackTrace, StackTracer};

#[derive(Debug, StackTracer)]
pub struct Leaf {
    #[traced(end)]
    source: std::io::Error,
    stack_trace: StackTrace,
}

impl core::fmt::Display for Leaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "leaf")
    }
}

impl core::error::Error for Leaf {}

#[derive(Debug, StackTracer)]
pub struct Wrapper<T> {
    source: T,
}

impl<T> core::fmt::Display for Wrapper<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "wrapper")
    }
}

impl<T: StackTracer> core::error::Error for Wrapper<T> {}

#[derive(Debug, StackTracer)]
pub struct External<E> {
    #[traced(end)]
    source: E,
    stack_trace: StackTrace,
}

impl<E> core::fmt::Display for External<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "external")
    }
}

impl<E: core::error::Error + 'static> core::error::Error for External<E> {}

fn assert_stack_tracer<T: StackTracer>() {}

fn main() {
    assert_stack_tracer::<Wrapper<Leaf>>();
    assert_stack_tracer::<Wrapper<Wrapper<Leaf>>>();
    assert_stack_tracer::<External<std::fmt::Error>>();

    let err = Wrapper {
        source: Leaf {
            source: std::io::Error::other("oh"),
            stack_trace: StackTrace::capture(),
        },
    };
    assert!(err.next().and_then(|link| link.recorded()).is_some());
}
