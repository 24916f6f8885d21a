//! # opt_parse
//!
//! A small getopt style command line option parser.
//!
//! 1. Build an [`OptParser`] (default prefixes `-` and `--`).
//! 2. Register [`OptSpec`]s with a short form, a long form, an [`ArgKind`]
//!    and optionally a matcher callback consulted when the option is
//!    encountered.
//! 3. Call [`OptParser::parse`] on the command line arguments and read the
//!    matched options and the non option tokens out of the [`ParseReport`].
//!
//! # Example
//!
//! ```rust
//! use opt_parse::{ArgKind, OptParser, OptSpec};
//!
//! let mut parser = OptParser::new();
//! parser.register(OptSpec::new("v", "verbose", ArgKind::None));
//! parser.register(OptSpec::new("o", "output", ArgKind::Required));
//!
//! let argv = ["tool", "-v", "--output", "out.txt", "input.txt"];
//! let report = parser.parse(&argv).unwrap();
//! assert_eq!("verbose", report.options()[0].0.long);
//! assert_eq!("out.txt", report.options()[1].1);
//! assert_eq!("input.txt", report.non_options()[0]);
//! ```

/// Error types of the crate.
pub mod errors;

/// Option specs and their matcher callbacks.
pub mod options;

/// The parser itself and its report.
pub mod parser;

pub use errors::{ParseError, ParseResult};
pub use options::{ArgKind, MatchOutcome, MatcherFn, OptSpec};
pub use parser::{OptParser, ParseReport};
