//! Connectivity invariants across connect, merge, ground and junction-split
//! sequences.

use std::collections::BTreeSet;

use volta_core::NodeId;
use volta_schematic::{Point, Schematic};

/// used_nodes must equal {0} plus the image of all assigned pin nodes, and
/// every wire must agree with its pin endpoints.
fn assert_node_invariants(s: &Schematic) {
    let mut pin_nodes = BTreeSet::new();
    pin_nodes.insert(0u32);
    for device in s.devices() {
        for pin in 0..device.pin_count() {
            if let Some(node) = device.node_for_pin(pin) {
                pin_nodes.insert(node.as_u32());
            }
        }
    }
    assert_eq!(
        s.used_nodes(),
        &pin_nodes,
        "used_nodes must be the exact image of pin nodes plus ground"
    );

    for &id in s.used_nodes() {
        assert!(
            id < s.next_node_id() || id == 0,
            "node {} must be below next_node_id {}",
            id,
            s.next_node_id()
        );
    }

    for (_, wire) in s.wires() {
        for endpoint in [wire.a, wire.b] {
            if let volta_schematic::Endpoint::Pin { device, pin } = endpoint {
                let node = s.device(device).unwrap().node_for_pin(pin);
                assert_eq!(
                    node,
                    Some(wire.node),
                    "wire node must match its pin endpoints"
                );
            }
        }
    }
}

#[test]
fn invariants_hold_across_connect_sequences() {
    let mut s = Schematic::new();
    let v1 = s.add_device("vsource", 0.0, 0.0).unwrap();
    let r1 = s.add_device("resistor", 100.0, 0.0).unwrap();
    let r2 = s.add_device("resistor", 200.0, 0.0).unwrap();
    let c1 = s.add_device("capacitor", 300.0, 0.0).unwrap();
    let gnd = s.add_device("ground", 0.0, 100.0).unwrap();

    assert_node_invariants(&s);

    s.connect_pins(v1, 0, r1, 0, vec![]);
    assert_node_invariants(&s);

    s.connect_pins(r1, 1, r2, 0, vec![]);
    assert_node_invariants(&s);

    s.connect_pins(r2, 1, c1, 0, vec![]);
    assert_node_invariants(&s);

    s.connect_to_ground(c1, 1, gnd, 0, vec![]);
    assert_node_invariants(&s);

    s.connect_pins(v1, 1, c1, 1, vec![]);
    assert_node_invariants(&s);
}

#[test]
fn merge_relabels_everything_and_retires_the_loser() {
    let mut s = Schematic::new();
    let r1 = s.add_device("resistor", 0.0, 0.0).unwrap();
    let r2 = s.add_device("resistor", 200.0, 0.0).unwrap();
    let r3 = s.add_device("resistor", 400.0, 0.0).unwrap();
    let r4 = s.add_device("resistor", 600.0, 0.0).unwrap();

    s.connect_pins(r1, 1, r2, 0, vec![]);
    s.connect_pins(r3, 1, r4, 0, vec![]);

    let winner = s.device(r1).unwrap().node_for_pin(1).unwrap();
    let loser = s.device(r3).unwrap().node_for_pin(1).unwrap();
    let next_before = s.next_node_id();

    s.connect_pins(r1, 1, r3, 1, vec![]);

    assert!(!s.used_nodes().contains(&loser.as_u32()));
    for (_, wire) in s.wires() {
        assert_ne!(wire.node, loser, "no wire may keep the retired id");
    }
    for device in s.devices() {
        for pin in 0..device.pin_count() {
            assert_ne!(device.node_for_pin(pin), Some(loser));
        }
    }
    assert_eq!(
        s.device(r4).unwrap().node_for_pin(0),
        Some(winner),
        "the whole losing net moves to the winner"
    );

    // The retired id is never reissued.
    assert!(s.next_node_id() >= next_before);
    let fresh = {
        let r5 = s.add_device("resistor", 800.0, 0.0).unwrap();
        let r6 = s.add_device("resistor", 1000.0, 0.0).unwrap();
        s.connect_pins(r5, 1, r6, 0, vec![]);
        s.device(r5).unwrap().node_for_pin(1).unwrap()
    };
    assert_ne!(fresh, loser);
    assert_node_invariants(&s);
}

#[test]
fn grounding_merged_nets_clears_their_ids() {
    // Pins on two distinct nets: grounding each leaves both on node 0
    // and retires both ids.
    let mut s = Schematic::new();
    let mut resistors = Vec::new();
    for i in 0..6 {
        resistors.push(s.add_device("resistor", 200.0 * i as f64, 0.0).unwrap());
    }
    for pair in resistors.chunks(2) {
        s.connect_pins(pair[0], 1, pair[1], 0, vec![]);
    }

    let pin_a = (resistors[4], 1usize); // some net
    let pin_b = (resistors[2], 1usize); // another net
    let node_a = s.device(pin_a.0).unwrap().node_for_pin(pin_a.1).unwrap();
    let node_b = s.device(pin_b.0).unwrap().node_for_pin(pin_b.1).unwrap();
    assert_ne!(node_a, node_b);

    let gnd1 = s.add_device("ground", 0.0, 300.0).unwrap();
    let gnd2 = s.add_device("ground", 400.0, 300.0).unwrap();

    assert!(s.connect_to_ground(pin_a.0, pin_a.1, gnd1, 0, vec![]));
    assert!(s.connect_to_ground(pin_b.0, pin_b.1, gnd2, 0, vec![]));

    assert_eq!(
        s.device(pin_a.0).unwrap().node_for_pin(pin_a.1),
        Some(NodeId::GROUND)
    );
    assert_eq!(
        s.device(pin_b.0).unwrap().node_for_pin(pin_b.1),
        Some(NodeId::GROUND)
    );
    assert!(!s.used_nodes().contains(&node_a.as_u32()));
    assert!(!s.used_nodes().contains(&node_b.as_u32()));
    assert_node_invariants(&s);
}

#[test]
fn junction_split_preserves_endpoints_and_waypoints() {
    // A wire A -> B with waypoints [w1, w2], split at p on the last
    // segment, becomes three wires whose concatenated path is
    // [A, w1, w2, p, B].
    let mut s = Schematic::new();
    let r1 = s.add_device("resistor", 0.0, 0.0).unwrap();
    let r2 = s.add_device("resistor", 400.0, 0.0).unwrap();
    let r3 = s.add_device("resistor", 200.0, 200.0).unwrap();

    let a = Point::from(s.device(r1).unwrap().absolute_pin_position(1).unwrap());
    let b = Point::from(s.device(r2).unwrap().absolute_pin_position(0).unwrap());
    let w1 = Point::new(150.0, -40.0);
    let w2 = Point::new(250.0, -40.0);
    assert!(s.connect_pins(r1, 1, r2, 0, vec![a, w1, w2, b]));

    let original_node = s.device(r1).unwrap().node_for_pin(1).unwrap();
    let (wire_id, _) = s.find_wire_at(300.0, -20.0, 8.0).expect("wire hit");

    // Split on the w2 -> B segment.
    let split = Point::new(300.0, -20.0);
    assert!(s.connect_to_wire(r3, 0, wire_id, split.x, split.y));

    // Original wire is gone; three wires remain.
    assert!(s.wire(wire_id).is_none());
    let wires: Vec<_> = s.wires().map(|(_, w)| w.clone()).collect();
    assert_eq!(wires.len(), 3);

    // All three carry the original node, as does the tapping pin.
    for w in &wires {
        assert_eq!(w.node, original_node);
    }
    assert_eq!(s.device(r3).unwrap().node_for_pin(0), Some(original_node));

    // One junction collects exactly the three wires.
    assert_eq!(s.junctions().len(), 1);
    let junction = &s.junctions()[0];
    assert_eq!(junction.wires.len(), 3);
    assert_eq!(junction.node, original_node);
    let p = junction.position;

    // Head and tail concatenate to [A, w1, w2, p, B].
    let head = wires
        .iter()
        .find(|w| w.path.first() == Some(&a))
        .expect("head wire");
    let tail = wires
        .iter()
        .find(|w| w.path.last() == Some(&b))
        .expect("tail wire");
    let mut concatenated = head.path.clone();
    concatenated.extend_from_slice(&tail.path[1..]);
    assert_eq!(concatenated, vec![a, w1, w2, p, b]);

    assert_node_invariants(&s);
}

#[test]
fn junction_split_onto_ground_wire_grounds_the_pin() {
    let mut s = Schematic::new();
    let r1 = s.add_device("resistor", 0.0, 0.0).unwrap();
    let gnd = s.add_device("ground", 400.0, 0.0).unwrap();
    let r2 = s.add_device("resistor", 200.0, 200.0).unwrap();

    assert!(s.connect_to_ground(r1, 1, gnd, 0, vec![]));
    let (wire_id, snap) = s.find_wire_at(200.0, 0.0, 8.0).expect("ground wire hit");

    assert!(s.connect_to_wire(r2, 0, wire_id, snap.x, snap.y));

    assert_eq!(s.device(r2).unwrap().node_for_pin(0), Some(NodeId::GROUND));
    for (_, wire) in s.wires() {
        assert!(wire.node.is_ground());
    }
    assert_node_invariants(&s);
}

#[test]
fn ground_component_tapping_a_wire_grounds_the_net() {
    let mut s = Schematic::new();
    let r1 = s.add_device("resistor", 0.0, 0.0).unwrap();
    let r2 = s.add_device("resistor", 400.0, 0.0).unwrap();
    let gnd = s.add_device("ground", 200.0, 200.0).unwrap();

    assert!(s.connect_pins(r1, 1, r2, 0, vec![]));
    let net = s.device(r1).unwrap().node_for_pin(1).unwrap();
    let (wire_id, snap) = s.find_wire_at(200.0, 0.0, 8.0).expect("wire hit");

    assert!(s.connect_to_wire(gnd, 0, wire_id, snap.x, snap.y));

    assert_eq!(s.device(r1).unwrap().node_for_pin(1), Some(NodeId::GROUND));
    assert_eq!(s.device(r2).unwrap().node_for_pin(0), Some(NodeId::GROUND));
    assert!(!s.used_nodes().contains(&net.as_u32()));
    assert_node_invariants(&s);
}

#[test]
fn netlist_is_stable_under_rotation() {
    let mut s = Schematic::new();
    let v1 = s.add_device("vsource", 0.0, 0.0).unwrap();
    let r1 = s.add_device("resistor", 100.0, 0.0).unwrap();
    let gnd = s.add_device("ground", 0.0, 100.0).unwrap();

    s.connect_pins(v1, 0, r1, 0, vec![]);
    s.connect_to_ground(r1, 1, gnd, 0, vec![]);
    let gnd2 = s.add_device("ground", -100.0, 100.0).unwrap();
    s.connect_to_ground(v1, 1, gnd2, 0, vec![]);

    let before = s.generate_netlist();

    // Rotation is an editor-side operation on the device itself; it must
    // not affect pin order or node assignment.
    let mut rotated = s.device(r1).unwrap().clone();
    rotated.rotate();
    assert_eq!(rotated.spice_line(), s.device(r1).unwrap().spice_line());

    assert_eq!(s.generate_netlist(), before);
}
