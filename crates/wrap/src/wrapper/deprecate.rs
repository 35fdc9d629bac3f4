use crate::wrapper::Wrapper;
use crate::{Function, Warnings};

pub const DEFAULT_DEPRECATION: &str = "This function will be removed in future versions.";

/// Warns on every call, then forwards it.
#[derive(Debug, Clone, Default)]
pub struct Deprecate {
    message: Option<String>,
    url: Option<String>,
    warnings: Warnings,
}

impl Deprecate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// where to read more, appended to the message
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn warnings(mut self, warnings: Warnings) -> Self {
        self.warnings = warnings;
        self
    }

    /// the full text emitted on every call
    pub fn notice(&self) -> String {
        let mut notice = self.message.clone().unwrap_or_else(|| DEFAULT_DEPRECATION.to_owned());
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            notice.push_str(&format!("\n\tSee {url} for more details."));
        }
        notice
    }
}

impl Wrapper<Function> for Deprecate {
    type Out = Function;

    fn wrap(&self, f: Function) -> Self::Out {
        let notice = self.notice();
        let warnings = self.warnings.clone();
        Function::new(move |invocation| {
            warnings.warn(&notice);
            f.call(invocation)
        })
    }
}

pub fn deprecate(f: Function) -> Function {
    Deprecate::new().wrap(f)
}

/// Mutes `warnings` while `f` runs; the previous sink comes back even if `f` fails.
pub fn suppress_warnings(warnings: &Warnings, f: Function) -> Function {
    let warnings = warnings.clone();
    Function::new(move |invocation| {
        let _muted = warnings.suppress();
        f.call(invocation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::MockWarningSink;
    use crate::{Output, WrapError};
    use mockall::Sequence;
    use serde_json::json;

    #[test]
    fn notice_formats() {
        assert_eq!(Deprecate::new().notice(), DEFAULT_DEPRECATION);
        assert_eq!(Deprecate::new().message("gone soon").notice(), "gone soon");
        assert_eq!(
            Deprecate::new().message("gone soon").url("http://example.com").notice(),
            "gone soon\n\tSee http://example.com for more details."
        );
        assert_eq!(Deprecate::new().url("").notice(), DEFAULT_DEPRECATION);
    }

    #[test]
    fn warns_then_forwards() {
        let mut sink = MockWarningSink::new();
        sink.expect_warn().withf(|message| message == DEFAULT_DEPRECATION).times(2).return_const(());

        let f = Deprecate::new().warnings(Warnings::new(sink)).wrap(Function::from_args(|args| args[0].clone()));

        assert_eq!(f.invoke([json!(1)]).unwrap().into_value(), Some(json!(1)));
        assert_eq!(f.invoke([json!(2)]).unwrap().into_value(), Some(json!(2)));
    }

    #[test]
    fn suppressed_call_is_silent_and_restores() {
        let mut seq = Sequence::new();
        let mut sink = MockWarningSink::new();
        sink.expect_warn().withf(|message| message == "outside").times(1).in_sequence(&mut seq).return_const(());

        let warnings = Warnings::new(sink);
        let noisy = Deprecate::new().warnings(warnings.clone()).wrap(Function::new(|_| Ok(Output::Unit)));
        let quiet = suppress_warnings(&warnings, noisy);

        quiet.invoke([]).unwrap();
        warnings.warn("outside");
    }

    #[test]
    fn suppression_ends_even_when_the_call_fails() {
        let mut sink = MockWarningSink::new();
        sink.expect_warn().withf(|message| message == "after failure").times(1).return_const(());

        let warnings = Warnings::new(sink);
        let failing = suppress_warnings(&warnings, Function::new(|_| Err(WrapError::raised("boom"))));

        assert_eq!(failing.invoke([]).unwrap_err(), WrapError::raised("boom"));
        warnings.warn("after failure");
    }
}
