//! Per-device MNA stamps for DC and transient analysis.
//!
//! The engine assumes the dense node numbering the parser produces: node
//! `k` occupies matrix row `k - 1`, ground has no row. Unconnected pins do
//! not reach the engine; they would stamp like ground.

use volta_core::{MnaSystem, NodeId};
use volta_devices::{Device, DeviceKind, ModelParams, MosfetType};

/// Large conductance standing in for an inductor's DC short circuit.
pub const G_SHORT: f64 = 1e6;

/// Forward drop of the piecewise DC diode model (V).
pub const DIODE_DROP: f64 = 0.7;

/// Forward conductance of the piecewise DC diode model (S).
pub const DIODE_CONDUCTANCE: f64 = 1e-3;

/// Fixed bias guess for the DC MOSFET stamp: Vgs = Vds = 2 V.
const MOS_BIAS_GUESS: f64 = 2.0;

/// Simplified PMOS DC small-signal constants.
const PMOS_GM: f64 = 50e-6;
const PMOS_GDS: f64 = 1e-6;

/// Matrix index of a device pin (`None` for ground or unconnected).
pub fn pin_index(device: &Device, pin: usize) -> Option<usize> {
    device.node_for_pin(pin).and_then(NodeId::matrix_index)
}

/// Stamp a device's DC model.
///
/// `vsource_row` is the branch index assigned to this device when it is a
/// voltage source; other kinds ignore it.
pub fn stamp_dc(device: &Device, mna: &mut MnaSystem, vsource_row: Option<usize>) {
    let i = pin_index(device, 0);
    let j = pin_index(device, 1);

    match device.kind() {
        DeviceKind::Resistor => {
            mna.stamp_conductance(i, j, 1.0 / device.value);
        }
        DeviceKind::Capacitor => {
            // Open circuit in DC.
        }
        DeviceKind::Inductor => {
            // Short circuit, approximated by a large conductance.
            mna.stamp_conductance(i, j, G_SHORT);
        }
        DeviceKind::VoltageSource => {
            if let Some(row) = vsource_row {
                mna.stamp_voltage_source(i, j, row, device.value);
            }
        }
        DeviceKind::CurrentSource => {
            // device.value amperes out of the positive pin.
            mna.stamp_current_source(i, j, device.value);
        }
        DeviceKind::Diode => {
            // Piecewise linearization: 0.7 V forward drop behind 1e-3 S.
            // i = g (v - 0.7), so the constant term injects g*0.7 into the
            // anode row.
            mna.stamp_conductance(i, j, DIODE_CONDUCTANCE);
            mna.stamp_current_source(j, i, DIODE_CONDUCTANCE * DIODE_DROP);
        }
        DeviceKind::Nmos => {
            if let ModelParams::Mosfet(params) = &device.params {
                let (_, gds, gm, _) =
                    params.evaluate(MosfetType::Nmos, MOS_BIAS_GUESS, MOS_BIAS_GUESS);
                stamp_mos_small_signal(mna, device, gm, gds);
            }
        }
        DeviceKind::Pmos => {
            log::warn!("{}: using simplified PMOS model", device.name);
            stamp_mos_small_signal(mna, device, PMOS_GM, PMOS_GDS);
        }
        DeviceKind::Ground => {}
        DeviceKind::OpAmp | DeviceKind::Npn => {
            log::warn!(
                "{}: {} is not supported by the analysis engine",
                device.name,
                device.kind().type_name()
            );
        }
    }
}

/// Stamp the MOSFET small-signal skeleton: output conductance `gds` between
/// drain and source plus the voltage-controlled current source
/// `I_d = gm (V_g - V_s) + gds (V_d - V_s)`.
fn stamp_mos_small_signal(mna: &mut MnaSystem, device: &Device, gm: f64, gds: f64) {
    let d = pin_index(device, 0);
    let g = pin_index(device, 1);
    let s = pin_index(device, 2);

    mna.stamp_conductance(d, s, gds);

    if let Some(di) = d {
        if let Some(gi) = g {
            mna.add_element(di, gi, gm);
        }
        if let Some(si) = s {
            mna.add_element(di, si, -gm);
        }
    }
    if let Some(si) = s {
        if let Some(gi) = g {
            mna.add_element(si, gi, -gm);
        }
        mna.add_element(si, si, gm);
    }
}

// ----------------------------------------------------------------------
// Backward-Euler companion models and per-step linearizations
// ----------------------------------------------------------------------

/// Capacitor companion for one backward-Euler step:
/// `G_eq = C/h` in parallel with `I_eq = G_eq * v_prev`.
pub fn stamp_capacitor_be(
    mna: &mut MnaSystem,
    i: Option<usize>,
    j: Option<usize>,
    capacitance: f64,
    h: f64,
    v_prev: f64,
) {
    let geq = capacitance / h;
    let ieq = geq * v_prev;

    mna.stamp_conductance(i, j, geq);
    // The history current charges the positive node.
    mna.stamp_current_source(j, i, ieq);
}

/// Inductor companion for one backward-Euler step:
/// `G_eq = h/L` in parallel with `I_eq = i_prev` flowing pin1 -> pin2.
pub fn stamp_inductor_be(
    mna: &mut MnaSystem,
    i: Option<usize>,
    j: Option<usize>,
    inductance: f64,
    h: f64,
    i_prev: f64,
) {
    let geq = h / inductance;

    mna.stamp_conductance(i, j, geq);
    mna.stamp_current_source(i, j, i_prev);
}

/// Diode linearized at the previous-step voltage `v_prev`:
/// conductance `g(v_prev)` plus `I_eq = I(v_prev) - g*v_prev`.
pub fn stamp_diode_linearized(mna: &mut MnaSystem, device: &Device, v_prev: f64) {
    let ModelParams::Diode(params) = &device.params else {
        return;
    };
    let (id, gd) = params.evaluate(v_prev);
    let ieq = id - gd * v_prev;

    let i = pin_index(device, 0);
    let j = pin_index(device, 1);

    mna.stamp_conductance(i, j, gd);
    mna.stamp_current_source(i, j, ieq);
}

/// MOSFET linearized at the previous-step `(vgs, vds)`:
/// the small-signal skeleton plus the companion current
/// `I_eq = Ids - gm*Vgs - gds*Vds` from drain to source.
pub fn stamp_mosfet_linearized(mna: &mut MnaSystem, device: &Device, vgs: f64, vds: f64) {
    let ModelParams::Mosfet(params) = &device.params else {
        return;
    };
    let mos_type = match device.kind() {
        DeviceKind::Pmos => MosfetType::Pmos,
        _ => MosfetType::Nmos,
    };
    let (ids, gds, gm, _) = params.evaluate(mos_type, vgs, vds);

    stamp_mos_small_signal(mna, device, gm, gds);

    let d = pin_index(device, 0);
    let s = pin_index(device, 2);
    let ieq = ids - gm * vgs - gds * vds;
    mna.stamp_current_source(d, s, ieq);
}

#[cfg(test)]
mod tests {
    use super::*;
    use volta_core::NodeId;

    fn two_pin(kind: DeviceKind, n1: u32, n2: u32, value: f64) -> Device {
        let mut d = Device::new("X", kind, 0.0, 0.0);
        d.value = value;
        d.set_node_for_pin(0, Some(NodeId::new(n1)));
        d.set_node_for_pin(1, Some(NodeId::new(n2)));
        d
    }

    #[test]
    fn test_resistor_stamp() {
        let mut mna = MnaSystem::new(2, 0);
        let r = two_pin(DeviceKind::Resistor, 1, 2, 1000.0);

        stamp_dc(&r, &mut mna, None);

        let g = 1e-3;
        assert!((mna.matrix()[(0, 0)] - g).abs() < 1e-12);
        assert!((mna.matrix()[(1, 1)] - g).abs() < 1e-12);
        assert!((mna.matrix()[(0, 1)] + g).abs() < 1e-12);
        assert!((mna.matrix()[(1, 0)] + g).abs() < 1e-12);
    }

    #[test]
    fn test_resistor_to_ground_keeps_diagonal() {
        let mut mna = MnaSystem::new(1, 0);
        let r = two_pin(DeviceKind::Resistor, 1, 0, 100.0);

        stamp_dc(&r, &mut mna, None);

        assert!((mna.matrix()[(0, 0)] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_capacitor_is_open_in_dc() {
        let mut mna = MnaSystem::new(2, 0);
        let c = two_pin(DeviceKind::Capacitor, 1, 2, 1e-6);

        stamp_dc(&c, &mut mna, None);

        assert_eq!(mna.matrix()[(0, 0)], 0.0);
        assert_eq!(mna.rhs()[0], 0.0);
    }

    #[test]
    fn test_inductor_is_short_in_dc() {
        let mut mna = MnaSystem::new(2, 0);
        let l = two_pin(DeviceKind::Inductor, 1, 2, 1e-3);

        stamp_dc(&l, &mut mna, None);

        assert_eq!(mna.matrix()[(0, 0)], G_SHORT);
        assert_eq!(mna.matrix()[(0, 1)], -G_SHORT);
    }

    #[test]
    fn test_vsource_stamp() {
        let mut mna = MnaSystem::new(2, 1);
        let v = two_pin(DeviceKind::VoltageSource, 1, 0, 5.0);

        stamp_dc(&v, &mut mna, Some(0));

        assert_eq!(mna.matrix()[(0, 2)], 1.0);
        assert_eq!(mna.matrix()[(2, 0)], 1.0);
        assert_eq!(mna.rhs()[2], 5.0);
    }

    #[test]
    fn test_diode_dc_injects_forward_drop() {
        let mut mna = MnaSystem::new(2, 0);
        let d = two_pin(DeviceKind::Diode, 1, 2, 0.0);

        stamp_dc(&d, &mut mna, None);

        let g = DIODE_CONDUCTANCE;
        assert!((mna.matrix()[(0, 0)] - g).abs() < 1e-15);
        // Anode row gains +g*0.7, cathode row loses it.
        assert!((mna.rhs()[0] - g * DIODE_DROP).abs() < 1e-15);
        assert!((mna.rhs()[1] + g * DIODE_DROP).abs() < 1e-15);
    }

    #[test]
    fn test_capacitor_companion() {
        let mut mna = MnaSystem::new(1, 0);

        // C = 1uF, h = 1us -> Geq = 1.0; v_prev = 2.5 -> Ieq = 2.5 into
        // the positive node.
        stamp_capacitor_be(&mut mna, Some(0), None, 1e-6, 1e-6, 2.5);

        assert!((mna.matrix()[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((mna.rhs()[0] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_inductor_companion() {
        let mut mna = MnaSystem::new(2, 0);

        // L = 1mH, h = 10us -> Geq = 0.01; i_prev = 2A from pin1 to pin2.
        stamp_inductor_be(&mut mna, Some(0), Some(1), 1e-3, 10e-6, 2.0);

        assert!((mna.matrix()[(0, 0)] - 0.01).abs() < 1e-12);
        assert!((mna.rhs()[0] + 2.0).abs() < 1e-12);
        assert!((mna.rhs()[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_diode_linearized_matches_model() {
        let mut mna = MnaSystem::new(2, 0);
        let d = two_pin(DeviceKind::Diode, 1, 2, 0.0);

        let v_prev = 0.6;
        stamp_diode_linearized(&mut mna, &d, v_prev);

        let ModelParams::Diode(params) = &d.params else {
            panic!("diode params expected");
        };
        let (id, gd) = params.evaluate(v_prev);
        let ieq = id - gd * v_prev;

        assert!((mna.matrix()[(0, 0)] - gd).abs() < 1e-15);
        assert!((mna.rhs()[0] + ieq).abs() < 1e-15);
    }

    #[test]
    fn test_nmos_dc_small_signal_shape() {
        // Drain = 1, gate = 2, source = ground.
        let mut m = Device::new("M1", DeviceKind::Nmos, 0.0, 0.0);
        m.set_node_for_pin(0, Some(NodeId::new(1)));
        m.set_node_for_pin(1, Some(NodeId::new(2)));
        m.set_node_for_pin(2, Some(NodeId::GROUND));
        m.set_node_for_pin(3, Some(NodeId::GROUND));

        let mut mna = MnaSystem::new(2, 0);
        stamp_dc(&m, &mut mna, None);

        let ModelParams::Mosfet(params) = &m.params else {
            panic!("mosfet params expected");
        };
        let (_, gds, gm, _) = params.evaluate(MosfetType::Nmos, 2.0, 2.0);

        // Drain diagonal carries gds, drain-gate the transconductance.
        assert!((mna.matrix()[(0, 0)] - gds).abs() < 1e-15);
        assert!((mna.matrix()[(0, 1)] - gm).abs() < 1e-15);
    }
}
