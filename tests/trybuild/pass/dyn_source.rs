use traced_error::{StackTrace, StackTracer};

#[derive(Debug, StackTracer)]
struct Leaf {
    stack_trace: StackTrace,
}

impl core::fmt::Display for Leaf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "leaf")
    }
}

impl core::error::Error for Leaf {}

#[derive(Debug, StackTracer)]
struct Traced {
    #[source]
    inner: Box<dyn StackTracer + Send + Sync>,
}

impl core::fmt::Display for Traced {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "traced")
    }
}

impl core::error::Error for Traced {}

#[derive(Debug, StackTracer)]
struct Plain {
    #[traced(end)]
    inner: Box<dyn core::error::Error + Send + Sync>,
    stack_trace: StackTrace,
}

impl core::fmt::Display for Plain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "plain")
    }
}

impl core::error::Error for Plain {}

fn main() {
    let traced = Traced {
        inner: Box::new(Leaf {
            stack_trace: StackTrace::capture(),
        }),
    };
    assert!(traced.next().and_then(|link| link.recorded()).is_some());

    let plain = Plain {
        inner: "oh".into(),
        stack_trace: StackTrace::capture(),
    };
    assert!(plain.next().is_some());
}
