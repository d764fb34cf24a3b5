//! SPICE netlist parsing for Volta.
//!
//! The [`lexer`] splits free-form netlist text into whitespace-delimited
//! token lines (folding `+` continuations, dropping `*` and `;` comments);
//! the [`parser`] turns token lines into [`volta_devices::Device`]s with
//! dense node ids and recognizes analysis directives.
//!
//! Malformed element lines and directives are reported through the `log`
//! facade and skipped; parsing continues with the next line.
//!
//! # Example
//!
//! ```
//! let result = volta_parser::parse(
//!     "* divider\n\
//!      V1 1 0 10\n\
//!      R1 1 2 1k\n\
//!      R2 2 0 1k\n\
//!      .op\n\
//!      .end\n",
//! );
//!
//! assert_eq!(result.devices.len(), 3);
//! assert_eq!(result.num_nodes, 3); // ground, 1, 2
//! assert_eq!(result.analyses.len(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use parser::{load_file, parse, ParseResult};
pub use types::{AcSweepType, AnalysisCommand};
