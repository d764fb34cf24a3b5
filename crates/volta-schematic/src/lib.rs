//! Schematic connectivity model for Volta.
//!
//! The [`Schematic`] owns the components, wires and junctions of an editing
//! session and keeps the net (node-id) assignment consistent through every
//! connect, merge, ground and junction-split operation. The editor holds
//! only [`DeviceId`]/[`WireId`]/[`JunctionId`] handles into the schematic's
//! arenas; handles stay valid until [`Schematic::clear`].
//!
//! Mutating operations follow a soft-refusal policy: they return `false`
//! (or `None`) on invalid input instead of failing, and report the reason
//! through the `log` facade.

pub mod geometry;
pub mod junction;
pub mod schematic;
pub mod wire;

pub use geometry::Point;
pub use junction::Junction;
pub use schematic::{DeviceId, JunctionId, Schematic, WireId, JUNCTION_TOLERANCE, PIN_TOLERANCE};
pub use wire::{Endpoint, Wire};
