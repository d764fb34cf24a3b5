//! Core circuit-analysis primitives for Volta.
//!
//! This crate provides the two foundations everything else builds on:
//!
//! - [`NodeId`] - Identifies a node in the circuit (ground is node 0)
//! - [`MnaSystem`](mna::MnaSystem) - The Modified Nodal Analysis equation `Gx = b`
//!
//! plus engineering-suffix value parsing in [`units`].
//!
//! # Modified Nodal Analysis (MNA)
//!
//! MNA formulates a circuit as a linear system whose unknowns are the
//! non-ground node voltages followed by one branch current per ideal
//! voltage source. A circuit with `numNodes` nodes (ground included) and
//! `Nv` voltage sources yields a system of side
//! `N = (numNodes - 1) + Nv`; node `k` (k >= 1) maps to row `k - 1`.
//!
//! # Example
//!
//! ```rust
//! use volta_core::mna::MnaSystem;
//!
//! // Voltage divider: V1 = 10V into node 1, R1 = R2 = 1k.
//! let mut mna = MnaSystem::new(2, 1);
//! mna.stamp_voltage_source(Some(0), None, 0, 10.0);
//! mna.stamp_conductance(Some(0), Some(1), 1e-3);
//! mna.stamp_conductance(Some(1), None, 1e-3);
//!
//! assert_eq!(mna.size(), 3); // 2 node voltages + 1 branch current
//! ```

pub mod mna;
pub mod node;
pub mod units;

pub use mna::MnaSystem;
pub use node::NodeId;
