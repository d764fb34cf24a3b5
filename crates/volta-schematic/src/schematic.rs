//! The connectivity manager: owns components, wires and junctions, and
//! keeps node-id assignment consistent across connects, merges, grounding
//! and junction splits.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

use volta_core::NodeId;
use volta_devices::{Device, DeviceKind};

use crate::geometry::Point;
use crate::junction::Junction;
use crate::wire::{Endpoint, Wire};

/// Hit-test radius for pins, in schematic units.
pub const PIN_TOLERANCE: f64 = 8.0;

/// Coincidence radius for reusing an existing junction.
pub const JUNCTION_TOLERANCE: f64 = 2.0;

/// Handle to a component in the schematic's device arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub(crate) usize);

impl DeviceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a wire. Stable across junction splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireId(pub(crate) usize);

impl WireId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JunctionId(pub(crate) usize);

impl JunctionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A circuit under edit: component/wire/junction arenas plus the node table.
///
/// Wires live in a slot vector so removal during a junction split keeps
/// every other [`WireId`] valid.
#[derive(Debug)]
pub struct Schematic {
    devices: Vec<Device>,
    wires: Vec<Option<Wire>>,
    junctions: Vec<Junction>,
    /// Auto-naming counters, one per name prefix.
    counters: HashMap<&'static str, u32>,
    /// Node ids currently in use. 0 (ground) is always present.
    used_nodes: BTreeSet<u32>,
    /// Next fresh node id; merged-away ids are never reissued.
    next_node_id: u32,
}

impl Default for Schematic {
    fn default() -> Self {
        Self::new()
    }
}

impl Schematic {
    pub fn new() -> Self {
        let mut used_nodes = BTreeSet::new();
        used_nodes.insert(0);
        Self {
            devices: Vec::new(),
            wires: Vec::new(),
            junctions: Vec::new(),
            counters: HashMap::new(),
            used_nodes,
            next_node_id: 1,
        }
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Place a new component of the named type, auto-naming it from the
    /// per-prefix counter (`R1`, `R2`, ... `GND1`, ...).
    ///
    /// Unknown type names are refused with a warning.
    pub fn add_device(&mut self, type_name: &str, x: f64, y: f64) -> Option<DeviceId> {
        let Some(kind) = DeviceKind::from_type_name(type_name) else {
            log::warn!("unknown component type: {}", type_name);
            return None;
        };

        let counter = self.counters.entry(kind.prefix()).or_insert(0);
        *counter += 1;
        let name = format!("{}{}", kind.prefix(), counter);

        let id = DeviceId(self.devices.len());
        self.devices.push(Device::new(name, kind, x, y));
        Some(id)
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0)
    }

    /// All components in insertion order. This is the device list analyses
    /// borrow.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Live wires with their handles.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (WireId(i), w)))
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id.0).and_then(|w| w.as_ref())
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    /// Node ids currently in use (always contains 0).
    pub fn used_nodes(&self) -> &BTreeSet<u32> {
        &self.used_nodes
    }

    /// The next id a fresh net would take.
    pub fn next_node_id(&self) -> u32 {
        self.next_node_id
    }

    /// First pin within [`PIN_TOLERANCE`] of the given position, in
    /// insertion order.
    pub fn find_pin_at(&self, x: f64, y: f64) -> Option<(DeviceId, usize)> {
        let p = Point::new(x, y);
        for (i, device) in self.devices.iter().enumerate() {
            for pin in 0..device.pin_count() {
                let Some(pos) = device.absolute_pin_position(pin) else {
                    continue;
                };
                if Point::from(pos).distance_to(p) <= PIN_TOLERANCE {
                    return Some((DeviceId(i), pin));
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect two pins with a wire, allocating or merging nets as needed.
    ///
    /// Node resolution:
    /// - both pins unconnected: allocate a fresh id
    /// - one side connected: reuse its id
    /// - both on the same net: refuse (already joined)
    /// - different nets: the first argument's id survives, the other net is
    ///   relabeled onto it and its id retired
    ///
    /// Ground symbols delegate to [`Schematic::connect_to_ground`].
    pub fn connect_pins(
        &mut self,
        a: DeviceId,
        pin_a: usize,
        b: DeviceId,
        pin_b: usize,
        path: Vec<Point>,
    ) -> bool {
        if a == b {
            log::warn!("refusing self-connection on device {}", a.0);
            return false;
        }
        if !self.valid_pin(a, pin_a) || !self.valid_pin(b, pin_b) {
            return false;
        }

        if self.devices[a.0].kind() == DeviceKind::Ground {
            return self.connect_to_ground(b, pin_b, a, pin_a, path);
        }
        if self.devices[b.0].kind() == DeviceKind::Ground {
            return self.connect_to_ground(a, pin_a, b, pin_b, path);
        }

        let node_a = self.devices[a.0].node_for_pin(pin_a);
        let node_b = self.devices[b.0].node_for_pin(pin_b);

        let final_node = match (node_a, node_b) {
            (None, None) => self.alloc_node(),
            (Some(n), None) | (None, Some(n)) => n,
            (Some(na), Some(nb)) if na == nb => {
                log::debug!("pins already joined on node {}", na);
                return false;
            }
            (Some(na), Some(nb)) => {
                // First argument's node is the canonical survivor.
                self.merge_nodes(nb, na);
                na
            }
        };

        self.devices[a.0].set_node_for_pin(pin_a, Some(final_node));
        self.devices[b.0].set_node_for_pin(pin_b, Some(final_node));

        let path = self.ensure_path(path, a, pin_a, b, pin_b);
        self.push_wire(Wire {
            a: Endpoint::Pin { device: a, pin: pin_a },
            b: Endpoint::Pin { device: b, pin: pin_b },
            node: final_node,
            path,
        });
        true
    }

    /// Connect a pin to ground through a ground symbol.
    ///
    /// Idempotent: a pin already on node 0 is refused and nothing changes.
    /// A pin on some other net relabels that whole net to 0.
    pub fn connect_to_ground(
        &mut self,
        c: DeviceId,
        pin: usize,
        ground: DeviceId,
        ground_pin: usize,
        path: Vec<Point>,
    ) -> bool {
        if !self.valid_pin(c, pin) || !self.valid_pin(ground, ground_pin) {
            return false;
        }

        match self.devices[c.0].node_for_pin(pin) {
            Some(n) if n.is_ground() => {
                log::debug!("{} pin {} already grounded", self.devices[c.0].name, pin);
                return false;
            }
            Some(n) => self.ground_node(n),
            None => {
                self.devices[c.0].set_node_for_pin(pin, Some(NodeId::GROUND));
            }
        }

        self.devices[ground.0].set_node_for_pin(ground_pin, Some(NodeId::GROUND));

        let path = self.ensure_path(path, c, pin, ground, ground_pin);
        self.push_wire(Wire {
            a: Endpoint::Pin { device: c, pin },
            b: Endpoint::Pin {
                device: ground,
                pin: ground_pin,
            },
            node: NodeId::GROUND,
            path,
        });
        true
    }

    /// The wire closest to `(x, y)` within `tol`, with the snapped point on
    /// its polyline.
    pub fn find_wire_at(&self, x: f64, y: f64, tol: f64) -> Option<(WireId, Point)> {
        let p = Point::new(x, y);
        let mut best: Option<(WireId, Point, f64)> = None;

        for (id, wire) in self.wires() {
            if let Some((_, snapped, dist)) = wire.closest_segment(p) {
                if dist <= tol && best.map_or(true, |(_, _, d)| dist < d) {
                    best = Some((id, snapped, dist));
                }
            }
        }

        best.map(|(id, snapped, _)| (id, snapped))
    }

    /// Tap a pin onto an existing wire: the junction split.
    ///
    /// The wire segment nearest `(jx, jy)` is split at the snapped point;
    /// the original wire is replaced by three wires (source-to-junction,
    /// junction-to-sink, pin-to-junction), all carrying the final node.
    /// Ground wins: if the tapping component is a ground symbol or the wire
    /// is on node 0, every non-zero side is relabeled to 0.
    pub fn connect_to_wire(
        &mut self,
        c: DeviceId,
        pin: usize,
        wire_id: WireId,
        jx: f64,
        jy: f64,
    ) -> bool {
        if !self.valid_pin(c, pin) {
            return false;
        }
        let Some(wire) = self.wire(wire_id).cloned() else {
            log::warn!("no such wire: {}", wire_id.0);
            return false;
        };
        let Some((segment, mut snap, _)) = wire.closest_segment(Point::new(jx, jy)) else {
            log::warn!("wire {} has a degenerate path", wire_id.0);
            return false;
        };

        // Decide the final node. Ground on either side wins.
        let device_is_ground = self.devices[c.0].kind() == DeviceKind::Ground;
        let pin_node = self.devices[c.0].node_for_pin(pin);

        let final_node = if device_is_ground || wire.node.is_ground() {
            if !wire.node.is_ground() {
                self.ground_node(wire.node);
            }
            if let Some(n) = pin_node {
                if !n.is_ground() {
                    self.ground_node(n);
                }
            }
            NodeId::GROUND
        } else {
            if let Some(n) = pin_node {
                if n != wire.node {
                    self.merge_nodes(n, wire.node);
                }
            }
            wire.node
        };

        // Reuse a coincident junction, otherwise create one at the snap.
        let junction_id = match self.junction_near(snap) {
            Some(id) => {
                snap = self.junctions[id.0].position;
                self.junctions[id.0].node = final_node;
                id
            }
            None => {
                let id = JunctionId(self.junctions.len());
                self.junctions.push(Junction::new(snap, final_node));
                id
            }
        };

        self.remove_wire(wire_id);

        // Source -> junction keeps the waypoints up to the split segment.
        let mut head = wire.path[..=segment].to_vec();
        head.push(snap);
        self.push_wire(Wire {
            a: wire.a,
            b: Endpoint::Junction(junction_id),
            node: final_node,
            path: head,
        });

        // Junction -> sink keeps the rest.
        let mut tail = vec![snap];
        tail.extend_from_slice(&wire.path[segment + 1..]);
        self.push_wire(Wire {
            a: Endpoint::Junction(junction_id),
            b: wire.b,
            node: final_node,
            path: tail,
        });

        // Pin -> junction.
        let pin_pos: Point = self.devices[c.0]
            .absolute_pin_position(pin)
            .expect("pin index validated")
            .into();
        self.push_wire(Wire {
            a: Endpoint::Pin { device: c, pin },
            b: Endpoint::Junction(junction_id),
            node: final_node,
            path: vec![pin_pos, snap],
        });

        self.devices[c.0].set_node_for_pin(pin, Some(final_node));
        true
    }

    // ------------------------------------------------------------------
    // Netlist and validation
    // ------------------------------------------------------------------

    /// Render the circuit as a SPICE netlist.
    ///
    /// Ground symbols are omitted; components with unconnected pins appear
    /// as a comment instead of an element line.
    pub fn generate_netlist(&self) -> String {
        let mut netlist = String::from("* Generated SPICE Netlist\n");

        for device in &self.devices {
            if device.kind() == DeviceKind::Ground {
                continue;
            }
            match device.spice_line() {
                Some(line) => {
                    let _ = writeln!(netlist, "{}", line);
                }
                None => {
                    let _ = writeln!(
                        netlist,
                        "* {} not fully connected ({} unconnected pins)",
                        device.name,
                        device.unconnected_pin_count()
                    );
                }
            }
        }

        netlist.push_str(".end\n");
        netlist
    }

    /// True when any pin sits on node 0.
    pub fn has_ground_reference(&self) -> bool {
        self.devices.iter().any(|d| {
            (0..d.pin_count()).any(|p| d.node_for_pin(p) == Some(NodeId::GROUND))
        })
    }

    /// Advisory validation: problems that make simulation pointless but do
    /// not block it.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.devices.is_empty() {
            errors.push("No components".to_string());
            return errors;
        }

        if !self.has_ground_reference() {
            errors.push("Circuit has no ground reference".to_string());
        }

        for device in &self.devices {
            if device.kind() == DeviceKind::Ground {
                continue;
            }
            let unconnected = device.unconnected_pin_count();
            if unconnected > 0 {
                errors.push(format!(
                    "{} has {} unconnected pins",
                    device.name, unconnected
                ));
            }
        }

        let has_vsource = self.devices.iter().any(|d| {
            d.kind() == DeviceKind::VoltageSource && d.is_fully_connected()
        });
        if !has_vsource {
            errors.push("No connected voltage source found".to_string());
        }

        errors
    }

    /// Drop everything and reset counters and the node table.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.wires.clear();
        self.junctions.clear();
        self.counters.clear();
        self.used_nodes.clear();
        self.used_nodes.insert(0);
        self.next_node_id = 1;
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn valid_pin(&self, id: DeviceId, pin: usize) -> bool {
        match self.devices.get(id.0) {
            Some(d) if pin < d.pin_count() => true,
            Some(d) => {
                log::warn!("invalid pin index {} for {}", pin, d.name);
                false
            }
            None => {
                log::warn!("no such device: {}", id.0);
                false
            }
        }
    }

    fn alloc_node(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.used_nodes.insert(id);
        NodeId::new(id)
    }

    /// Relabel everything on `old` to `new` and retire `old`.
    fn merge_nodes(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        log::debug!("merging node {} into node {}", old, new);
        self.relabel(old, new);
        self.used_nodes.remove(&old.as_u32());
    }

    /// Relabel everything on `node` to ground and retire the id.
    fn ground_node(&mut self, node: NodeId) {
        if node.is_ground() {
            return;
        }
        log::debug!("grounding node {}", node);
        self.relabel(node, NodeId::GROUND);
        self.used_nodes.remove(&node.as_u32());
    }

    fn relabel(&mut self, from: NodeId, to: NodeId) {
        for device in &mut self.devices {
            for pin in 0..device.pin_count() {
                if device.node_for_pin(pin) == Some(from) {
                    device.set_node_for_pin(pin, Some(to));
                }
            }
        }
        for wire in self.wires.iter_mut().flatten() {
            if wire.node == from {
                wire.node = to;
            }
        }
        for junction in &mut self.junctions {
            if junction.node == from {
                junction.node = to;
            }
        }
    }

    /// Default straight path between the two pins when the caller passed
    /// none.
    fn ensure_path(
        &self,
        path: Vec<Point>,
        a: DeviceId,
        pin_a: usize,
        b: DeviceId,
        pin_b: usize,
    ) -> Vec<Point> {
        if path.len() >= 2 {
            return path;
        }
        let start = self.devices[a.0]
            .absolute_pin_position(pin_a)
            .expect("pin index validated");
        let end = self.devices[b.0]
            .absolute_pin_position(pin_b)
            .expect("pin index validated");
        vec![start.into(), end.into()]
    }

    fn push_wire(&mut self, wire: Wire) -> WireId {
        let id = WireId(self.wires.len());
        for endpoint in [wire.a, wire.b] {
            if let Some(j) = endpoint.junction() {
                self.junctions[j.0].attach(id);
            }
        }
        self.wires.push(Some(wire));
        id
    }

    fn remove_wire(&mut self, id: WireId) {
        let Some(wire) = self.wires.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        for endpoint in [wire.a, wire.b] {
            if let Some(j) = endpoint.junction() {
                self.junctions[j.0].detach(id);
            }
        }
    }

    fn junction_near(&self, p: Point) -> Option<JunctionId> {
        self.junctions
            .iter()
            .position(|j| j.position.distance_to(p) <= JUNCTION_TOLERANCE)
            .map(JunctionId)
    }
}
