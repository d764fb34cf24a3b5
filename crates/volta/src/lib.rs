//! # Volta
//!
//! An interactive SPICE-style circuit simulator.
//!
//! Volta provides a schematic-level connectivity model, a SPICE netlist
//! parser, and a teaching-grade MNA analysis engine:
//!
//! - Schematic editing: components with pins, wires, junctions, and
//!   automatic node-id management
//! - Netlist parsing with engineering-suffix values and analysis directives
//! - DC operating point and backward-Euler transient analysis
//! - Device models for R, C, L, V, I, diode and level-1 MOSFETs
//!
//! ## Quick start
//!
//! ```rust
//! use volta::prelude::*;
//!
//! let result = volta::parse(
//!     "V1 1 0 10\n\
//!      R1 1 2 1k\n\
//!      R2 2 0 1k\n\
//!      .op\n\
//!      .end\n",
//! );
//!
//! let mut dc = DcAnalysis::new(&result.devices, result.num_nodes);
//! dc.solve().unwrap();
//! assert!((dc.node_voltage(2) - 5.0).abs() < 1e-9);
//! ```

// Re-export the workspace crates.
pub use volta_core as core;
pub use volta_devices as devices;
pub use volta_parser as parser;
pub use volta_schematic as schematic;
pub use volta_solver as solver;

// Core types.
pub use volta_core::units::{format_engineering, parse_value};
pub use volta_core::{MnaSystem, NodeId};

// Device model.
pub use volta_devices::{
    Device, DeviceKind, DiodeParams, MosfetParams, MosfetRegion, MosfetType, Rotation,
};

// Schematic.
pub use volta_schematic::{DeviceId, Junction, JunctionId, Point, Schematic, Wire, WireId};

// Parser.
pub use volta_parser::{load_file, parse, AnalysisCommand, ParseResult};

// Solver.
pub use volta_solver::{
    solve_dense, DcAnalysis, TimePoint, TransientAnalysis, TransientSettings,
};

/// Re-export of nalgebra's dynamic vector and matrix types.
pub use nalgebra::{DMatrix, DVector};

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::{parse, parse_value, AnalysisCommand, MnaSystem, NodeId};
    pub use crate::{DcAnalysis, TimePoint, TransientAnalysis, TransientSettings};
    pub use crate::{Device, DeviceKind, Schematic};
    pub use crate::{DMatrix, DVector};
}
