use crate::wrapper::Wrapper;
use crate::{Function, Output, Warnings};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Forwards at most `max_times` calls, later calls warn and produce no result.
#[derive(Debug, Clone)]
pub struct Allow {
    max_times: usize,
    warnings: Warnings,
}

impl Allow {
    pub fn new(max_times: usize) -> Self {
        Self { max_times, warnings: Warnings::default() }
    }

    pub fn warnings(mut self, warnings: Warnings) -> Self {
        self.warnings = warnings;
        self
    }
}

impl Wrapper<Function> for Allow {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let max_times = self.max_times;
        let warnings = self.warnings.clone();
        let remaining = AtomicUsize::new(max_times);

        Function::new(move |invocation| {
            let allowed = remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)).is_ok();
            if allowed {
                f.call(invocation)
            } else {
                warnings.warn(&format!("This function should not be called more than {max_times} times."));
                Ok(Output::Unit)
            }
        })
    }
}

pub fn allow(max_times: usize, f: Function) -> Function {
    Allow::new(max_times).wrap(f)
}

pub fn once(f: Function) -> Function {
    allow(1, f)
}
