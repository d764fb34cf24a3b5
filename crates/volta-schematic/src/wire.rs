//! Wires: polyline connections between pins and junctions.

use volta_core::NodeId;

use crate::geometry::{closest_point_on_segment, Point};
use crate::schematic::{DeviceId, JunctionId};

/// One end of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// A component pin.
    Pin { device: DeviceId, pin: usize },
    /// A junction created by splitting a wire.
    Junction(JunctionId),
}

impl Endpoint {
    /// The junction this endpoint sits on, if any.
    pub fn junction(&self) -> Option<JunctionId> {
        match self {
            Endpoint::Junction(j) => Some(*j),
            Endpoint::Pin { .. } => None,
        }
    }
}

/// A wire between two endpoints.
///
/// The path runs from the `a` endpoint to the `b` endpoint, waypoints in
/// between. Invariant: every pin endpoint's node equals `node`.
#[derive(Debug, Clone)]
pub struct Wire {
    pub a: Endpoint,
    pub b: Endpoint,
    /// Net this wire belongs to.
    pub node: NodeId,
    /// Polyline from `a` to `b` in schematic coordinates.
    pub path: Vec<Point>,
}

impl Wire {
    /// Find the path segment closest to `p`.
    ///
    /// Returns `(segment_index, snapped_point, distance)` where the segment
    /// runs from `path[i]` to `path[i + 1]`. `None` for degenerate paths.
    pub fn closest_segment(&self, p: Point) -> Option<(usize, Point, f64)> {
        let mut best: Option<(usize, Point, f64)> = None;

        for i in 0..self.path.len().saturating_sub(1) {
            let snapped = closest_point_on_segment(p, self.path[i], self.path[i + 1]);
            let dist = p.distance_to(snapped);
            if best.map_or(true, |(_, _, d)| dist < d) {
                best = Some((i, snapped, dist));
            }
        }

        best
    }

    /// Distance from `p` to the wire's polyline.
    pub fn distance_to(&self, p: Point) -> Option<f64> {
        self.closest_segment(p).map(|(_, _, d)| d)
    }
}
