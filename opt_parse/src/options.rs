use std::fmt;
use std::sync::Arc;

/// Whether an option takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgKind {
    /// The option stands alone.
    #[default]
    None,
    /// The option requires an argument; the next token must not look like
    /// an option.
    Required,
    /// The option consumes the next token as its argument only when that
    /// token does not look like an option.
    Optional,
}

/// What a matcher callback decided about the value it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The value is accepted and recorded with the option.
    Accepted,
    /// The option is recorded, but the matcher did not take the value.
    AcceptedWithoutValue,
    /// The value is rejected; parsing stops with an error.
    Rejected,
}

/// The callback an option may carry to validate its value at parse time.
pub type MatcherFn = dyn Fn(&OptSpec, &str) -> MatchOutcome + Send + Sync;

/// One registered command line option: a short form, a long form, whether it
/// takes an argument, and an optional matcher callback invoked when the
/// option is encountered.
///
/// Names are given without their prefix: register `v`, not `-v`.
#[derive(Clone, Default)]
pub struct OptSpec {
    pub short: String,
    pub long: String,
    pub arg: ArgKind,
    pub(crate) matcher: Option<Arc<MatcherFn>>,
}

impl OptSpec {
    /// Builds an option with a short and a long name. Either may be empty,
    /// but not both.
    pub fn new(short: impl Into<String>, long: impl Into<String>, arg: ArgKind) -> Self {
        Self {
            short: short.into(),
            long: long.into(),
            arg,
            matcher: None,
        }
    }

    /// Attaches a matcher callback consulted whenever the option is
    /// encountered.
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&OptSpec, &str) -> MatchOutcome + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// The name to report this option under: the long name when present,
    /// the short one otherwise.
    pub fn display_name(&self) -> &str {
        if self.long.is_empty() {
            &self.short
        } else {
            &self.long
        }
    }
}

impl fmt::Debug for OptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptSpec")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("arg", &self.arg)
            .field("has_matcher", &self.matcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_the_long_form() {
        let spec = OptSpec::new("s", "short", ArgKind::None);
        assert_eq!("short", spec.display_name());
        let spec = OptSpec::new("s", "", ArgKind::None);
        assert_eq!("s", spec.display_name());
    }

    #[test]
    fn test_with_matcher_is_recorded() {
        let spec = OptSpec::new("v", "verbose", ArgKind::None)
            .with_matcher(|_spec, _value| MatchOutcome::Accepted);
        assert!(spec.matcher.is_some());
        assert!(format!("{spec:?}").contains("has_matcher: true"));
    }
}
