use crate::errors::{ParseError, ParseResult};
use crate::options::{ArgKind, MatchOutcome, OptSpec};

/// Everything a successful parse produced: the matched options with their
/// values, in the order they were encountered from left to right, and every
/// token that was not an option.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    options: Vec<(OptSpec, String)>,
    non_options: Vec<String>,
}

impl ParseReport {
    /// The matched `(option, value)` pairs in encounter order. Options
    /// without an argument carry an empty value.
    pub fn options(&self) -> &[(OptSpec, String)] {
        &self.options
    }

    /// Every non option token, in encounter order.
    pub fn non_options(&self) -> &[String] {
        &self.non_options
    }
}

/// A getopt style parser.
///
/// Options are registered up front, then `parse` is run over the command
/// line arguments. Short options are recognized by the short prefix
/// (default `-`), long options by the long prefix (default `--`). The first
/// argument is taken to be the program name and skipped.
pub struct OptParser {
    specs: Vec<OptSpec>,
    short_prefix: String,
    long_prefix: String,
}

impl Default for OptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OptParser {
    /// A parser with the conventional `-` / `--` prefixes.
    pub fn new() -> Self {
        Self::with_prefixes("-", "--")
    }

    /// A parser with custom option prefixes.
    pub fn with_prefixes(short: impl Into<String>, long: impl Into<String>) -> Self {
        Self {
            specs: Vec::new(),
            short_prefix: short.into(),
            long_prefix: long.into(),
        }
    }

    /// Registers an option. Returns `false` (and registers nothing) when the
    /// spec has neither a short nor a long name.
    pub fn register(&mut self, spec: OptSpec) -> bool {
        if spec.short.is_empty() && spec.long.is_empty() {
            return false;
        }
        self.specs.push(spec);
        true
    }

    /// Parses `argv` (program name first) against the registered options.
    ///
    /// Parsing stops at the first problem: an unknown option, a required
    /// argument that is missing or looks like an option, or a value the
    /// option's matcher rejected.
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> ParseResult<ParseReport> {
        let mut report = ParseReport::default();
        let mut index = 1;
        while index < argv.len() {
            let arg = argv[index].as_ref();
            if !self.is_option(arg) {
                report.non_options.push(arg.to_string());
                index += 1;
                continue;
            }
            let is_long = self.is_long(arg);
            let name = self.strip_prefix(arg);
            let spec = self
                .lookup(name, is_long)
                .ok_or_else(|| ParseError::InvalidOption(arg.to_string()))?;

            let value = match spec.arg {
                ArgKind::None => String::new(),
                ArgKind::Required => {
                    let next = argv.get(index + 1).map(AsRef::as_ref);
                    match next {
                        Some(next) if !self.is_option(next) => {
                            index += 1;
                            next.to_string()
                        }
                        _ => {
                            return Err(ParseError::MissingArgument(
                                spec.display_name().to_string(),
                            ))
                        }
                    }
                }
                ArgKind::Optional => match argv.get(index + 1).map(AsRef::as_ref) {
                    Some(next) if !self.is_option(next) => {
                        index += 1;
                        next.to_string()
                    }
                    _ => String::new(),
                },
            };

            let recorded = match &spec.matcher {
                Some(matcher) => match matcher(spec, &value) {
                    MatchOutcome::Accepted => value,
                    MatchOutcome::AcceptedWithoutValue => String::new(),
                    MatchOutcome::Rejected => {
                        return Err(ParseError::ArgumentRejected {
                            option: spec.display_name().to_string(),
                            value,
                        })
                    }
                },
                None => value,
            };
            report.options.push((spec.clone(), recorded));
            index += 1;
        }
        Ok(report)
    }

    fn lookup(&self, name: &str, is_long: bool) -> Option<&OptSpec> {
        self.specs.iter().find(|spec| {
            let candidate = if is_long { &spec.long } else { &spec.short };
            !candidate.is_empty() && candidate == name
        })
    }

    fn is_option(&self, arg: &str) -> bool {
        self.is_long(arg) || self.is_short(arg)
    }

    fn is_long(&self, arg: &str) -> bool {
        arg.len() > self.long_prefix.len() && arg.starts_with(self.long_prefix.as_str())
    }

    fn is_short(&self, arg: &str) -> bool {
        arg.len() > self.short_prefix.len() && arg.starts_with(self.short_prefix.as_str())
    }

    fn strip_prefix<'a>(&self, arg: &'a str) -> &'a str {
        if self.is_long(arg) {
            &arg[self.long_prefix.len()..]
        } else {
            &arg[self.short_prefix.len()..]
        }
    }
}
