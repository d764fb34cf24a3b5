//! Circuit analysis engine for Volta.
//!
//! Two analyses over a borrowed device list:
//!
//! - [`DcAnalysis`] - DC operating point
//! - [`TransientAnalysis`] - backward-Euler time stepping with companion
//!   models for reactive elements and once-per-step linearization of
//!   nonlinear devices
//!
//! Both build a dense MNA system and solve it with Gaussian elimination
//! under partial pivoting ([`linear::solve_dense`]); a pivot below `1e-12`
//! aborts with [`Error::SingularMatrix`].
//!
//! # Example
//!
//! ```
//! use volta_parser::parse;
//! use volta_solver::DcAnalysis;
//!
//! let result = parse("V1 1 0 10\nR1 1 2 1k\nR2 2 0 1k\n.op\n.end\n");
//! let mut dc = DcAnalysis::new(&result.devices, result.num_nodes);
//! dc.solve().unwrap();
//!
//! assert!((dc.node_voltage(2) - 5.0).abs() < 1e-9);
//! ```

pub mod dc;
pub mod error;
pub mod linear;
pub mod stamp;
pub mod transient;

pub use dc::DcAnalysis;
pub use error::{Error, Result};
pub use linear::solve_dense;
pub use transient::{TimePoint, TransientAnalysis, TransientSettings};
