//! Helpers used by `#[derive(StackTracer)]`. Method-call syntax on these lets the generated
//! code see through `Box` and trait objects.

use core::error::Error;

use crate::StackTracer;

/// Views an `end` field as a plain error.
#[doc(hidden)]
pub trait AsDynStdError: Sealed {
    fn as_dyn_std_error(&self) -> &(dyn Error + 'static);
}

/// Views a `source` field as the next traced link.
#[doc(hidden)]
pub trait AsDynStackTracer: Sealed {
    fn as_dyn_stack_tracer(&self) -> &dyn StackTracer;
}

#[doc(hidden)]
pub trait Sealed {}

impl<T: Error> Sealed for T {}

impl<T: Error + 'static> AsDynStdError for T {
    #[inline]
    fn as_dyn_std_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl<T: StackTracer> AsDynStackTracer for T {
    #[inline]
    fn as_dyn_stack_tracer(&self) -> &dyn StackTracer {
        self
    }
}

// Unsized targets reached by auto-deref from `Box<dyn ..>` fields.
macro_rules! impl_for_dyn {
    ($helper:ident :: $method:ident -> $target:ty { $($object:ty),* }) => {$(
        impl Sealed for $object {}

        impl $helper for $object {
            #[inline]
            fn $method(&self) -> &$target {
                self
            }
        }
    )*};
}

impl_for_dyn!(AsDynStdError::as_dyn_std_error -> (dyn Error + 'static) {
    dyn Error + 'static,
    dyn Error + Send + Sync + 'static
});

impl_for_dyn!(AsDynStackTracer::as_dyn_stack_tracer -> dyn StackTracer {
    dyn StackTracer + '_,
    dyn StackTracer + Send + Sync + '_
});
