//! Junctions: points where three or more wire segments meet.

use volta_core::NodeId;

use crate::geometry::Point;
use crate::schematic::WireId;

/// A junction point on the schematic.
#[derive(Debug, Clone)]
pub struct Junction {
    /// Snapped position on the split wire.
    pub position: Point,
    /// Net the junction belongs to.
    pub node: NodeId,
    /// Wires incident on this junction.
    pub wires: Vec<WireId>,
}

impl Junction {
    pub fn new(position: Point, node: NodeId) -> Self {
        Self {
            position,
            node,
            wires: Vec::new(),
        }
    }

    /// Register an incident wire.
    pub fn attach(&mut self, wire: WireId) {
        if !self.wires.contains(&wire) {
            self.wires.push(wire);
        }
    }

    /// Remove an incident wire.
    pub fn detach(&mut self, wire: WireId) {
        self.wires.retain(|&w| w != wire);
    }
}
