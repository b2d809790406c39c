use std::io;

use proptest::prelude::*;
use traced_error::{
    Chain, StackTracer, StackTracerExt, TracedError, cause, find_stack_trace, format_err, new,
    traced, with_message, with_stack, wrap, wrap_err,
};

#[test]
fn new_keeps_message() {
    let err = new("test");
    assert_eq!(err.to_string(), "test");
}

#[test]
fn format_err_formats_message() {
    let err = format_err!("code {}", 42);
    let line = line!() - 1;
    assert_eq!(err.to_string(), "code 42");
    assert_eq!(err.stack_trace().location().line(), line);
    assert_eq!(err.stack_trace().location().file(), file!());
}

#[test]
fn wrap_err_formats_message() {
    let err = wrap_err!(io::Error::other("test"), "msg {}", 1);
    let line = line!() - 1;
    assert_eq!(err.to_string(), "msg 1: test");
    assert_eq!(err.stack_trace().location().line(), line);
    assert_eq!(err.stack_trace().location().file(), file!());
}

#[test]
fn with_message_on_traced_error() {
    let base = new("test");
    let origin = base.stack_trace().clone();
    let err = with_message(base, "msg");
    assert_eq!(err.to_string(), "msg: test");
    assert_eq!(err.stack_trace(), &origin);
}

#[test]
fn with_message_on_plain_error() {
    let err = with_message(io::Error::other("test"), "msg");
    let line = line!() - 1;
    assert_eq!(err.to_string(), "msg: test");
    assert_eq!(err.stack_trace().location().line(), line);
}

#[test]
fn with_message_finds_trace_behind_plain_layers() {
    #[derive(Debug)]
    struct Outer(TracedError);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "outer: {}", self.0)
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    let inner = new("inner");
    let origin = inner.stack_trace().clone();
    let err = with_message(Outer(inner), "msg");
    assert_eq!(err.to_string(), "msg: outer: inner");
    assert_eq!(err.stack_trace(), &origin);
}

#[test]
fn with_message_keeps_trace_of_boxed_traced_error() {
    let inner = new("inner");
    let origin = inner.stack_trace().clone();
    let err = with_message(Box::new(inner), "msg");
    assert_eq!(err.to_string(), "msg: inner");
    assert_eq!(err.stack_trace(), &origin);
}

#[test]
fn traced_keeps_boxed_traced_error() {
    let inner = new("inner");
    let origin = inner.stack_trace().clone();
    let err = traced(Some(Box::new(inner))).map(|err| err.stack_trace().clone());
    assert_eq!(err, Some(origin));
}

#[test]
fn with_stack_on_plain_error() {
    let err = with_stack(io::Error::other("test"));
    assert_eq!(err.to_string(), "test");
    assert!(find_stack_trace(&err).is_some());
}

#[test]
fn wrap_on_plain_error() {
    let err = wrap(io::Error::other("test"), "msg");
    assert_eq!(err.to_string(), "msg: test");
}

#[test]
fn wrap_records_its_own_call_site() {
    let base = new("test");
    let origin = base.stack_trace().location();
    let err = wrap(base, "msg");
    let line = line!() - 1;
    assert_ne!(err.stack_trace().location(), origin);
    assert_eq!(err.stack_trace().location().line(), line);
}

#[test]
fn cause_returns_the_root() {
    let err = wrap(wrap(new("root"), "a"), "b");
    assert_eq!(cause(&err).to_string(), "root");
}

#[test]
fn traced_none_is_none() {
    assert!(traced(None::<io::Error>).is_none());
}

#[test]
fn chain_lists_every_link() {
    let err = with_message(io::Error::other("disk"), "saving");
    let links: Vec<bool> = err.chain().map(|link| link.recorded().is_some()).collect();
    assert_eq!(links, [false, true, false]);
    assert!(matches!(err.chain().last(), Some(Chain::Std(_))));
}

#[test]
fn shared_across_threads() {
    let err = std::sync::Arc::new(new("shared"));
    let origin = err.stack_trace().clone();
    let handle = {
        let err = std::sync::Arc::clone(&err);
        std::thread::spawn(move || err.stack_trace().clone())
    };
    assert_eq!(handle.join().ok(), Some(origin));
}

#[test]
fn recorded_is_none_for_annotations() {
    let err = with_message(new("root"), "msg");
    assert!(err.recorded().is_none());
}

#[cfg(feature = "backtrace")]
mod frames {
    use super::*;

    fn mentions_function(err: &TracedError, name: &str) -> bool {
        err.stack_trace()
            .frames()
            .iter()
            .any(|frame| frame.function().is_some_and(|function| function.contains(name)))
    }

    #[test]
    fn new_records_calling_function() {
        let err = new("boom");
        assert!(mentions_function(&err, "new_records_calling_function"));
        assert!(err.stack_trace().to_string().contains("errors.rs"));
    }

    #[test]
    fn with_message_on_plain_error_records_calling_function() {
        let err = with_message(io::Error::other("test"), "msg");
        assert!(mentions_function(
            &err,
            "with_message_on_plain_error_records_calling_function"
        ));
    }

    fn make_root() -> TracedError {
        new("root")
    }

    #[test]
    fn with_message_keeps_origin_function() {
        let err = with_message(make_root(), "msg");
        assert!(mentions_function(&err, "make_root"));
    }

    #[test]
    fn wrap_records_wrapping_function() {
        fn wrap_here(err: TracedError) -> TracedError {
            wrap(err, "msg")
        }

        let err = wrap_here(make_root());
        assert!(mentions_function(&err, "wrap_here"));
        assert!(!mentions_function(&err, "make_root"));
    }
}

proptest! {
    #[test]
    fn new_display_is_message(message in ".*") {
        prop_assert_eq!(new(&message).to_string(), message);
    }

    #[test]
    fn with_message_prefixes(message in ".*", inner in ".*") {
        let err = with_message(io::Error::other(inner.clone()), &message);
        prop_assert_eq!(err.to_string(), format!("{message}: {inner}"));
    }

    #[test]
    fn wrap_prefixes(message in ".*", inner in ".*") {
        let err = wrap(new(&inner), &message);
        prop_assert_eq!(err.to_string(), format!("{message}: {inner}"));
    }

    #[test]
    fn repeated_messages_keep_origin(messages in proptest::collection::vec(".*", 1..8)) {
        let mut err = new("root");
        let origin = err.stack_trace().clone();
        for message in &messages {
            err = with_message(err, message);
        }
        prop_assert_eq!(err.stack_trace(), &origin);
        prop_assert_eq!(cause(&err).to_string(), "root");
    }
}
