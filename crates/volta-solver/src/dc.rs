//! DC operating-point analysis.

use indexmap::IndexMap;
use nalgebra::DVector;
use volta_core::MnaSystem;
use volta_devices::{Device, DeviceKind};

use crate::error::Result;
use crate::linear::solve_dense;
use crate::stamp;

/// Assign each voltage source a branch row in first-seen order.
pub(crate) fn index_voltage_sources(devices: &[Device]) -> IndexMap<String, usize> {
    let mut rows = IndexMap::new();
    for device in devices {
        if device.kind() == DeviceKind::VoltageSource {
            let next = rows.len();
            rows.entry(device.name.clone()).or_insert(next);
        }
    }
    rows
}

/// A DC operating-point analysis over a borrowed device list.
///
/// The analysis owns its matrices and solution; the caller guarantees the
/// device list carries the dense node numbering the parser produces and is
/// not mutated while the analysis is alive.
#[derive(Debug)]
pub struct DcAnalysis<'a> {
    devices: &'a [Device],
    /// Node count, ground included.
    num_nodes: usize,
    vsource_rows: IndexMap<String, usize>,
    solution: Option<DVector<f64>>,
}

impl<'a> DcAnalysis<'a> {
    /// Set up an analysis for `num_nodes` nodes (ground included).
    pub fn new(devices: &'a [Device], num_nodes: usize) -> Self {
        Self {
            devices,
            num_nodes: num_nodes.max(1),
            vsource_rows: index_voltage_sources(devices),
            solution: None,
        }
    }

    /// Matrix side: independent nodes plus one row per voltage source.
    pub fn matrix_size(&self) -> usize {
        (self.num_nodes - 1) + self.vsource_rows.len()
    }

    /// Build and solve the DC system. Repeated calls rebuild from scratch
    /// and produce identical solutions.
    pub fn solve(&mut self) -> Result<()> {
        let mna = self.build_system();
        let x = solve_dense(mna.matrix(), mna.rhs())?;
        self.solution = Some(x);
        Ok(())
    }

    fn build_system(&self) -> MnaSystem {
        let mut mna = MnaSystem::new(self.num_nodes - 1, self.vsource_rows.len());
        for device in self.devices {
            let row = self.vsource_rows.get(&device.name).copied();
            stamp::stamp_dc(device, &mut mna, row);
        }
        mna
    }

    /// Voltage at node `k`. Ground and out-of-range nodes read 0.0.
    pub fn node_voltage(&self, node: u32) -> f64 {
        if node == 0 {
            return 0.0;
        }
        let idx = (node - 1) as usize;
        match &self.solution {
            Some(x) if idx < self.num_nodes - 1 => x[idx],
            _ => 0.0,
        }
    }

    /// Branch current through a named voltage source, positive from the
    /// `+` terminal through the source to the `-` terminal. Unknown names
    /// read 0.0.
    pub fn vsource_current(&self, name: &str) -> f64 {
        let Some(&row) = self.vsource_rows.get(name) else {
            return 0.0;
        };
        match &self.solution {
            Some(x) => x[(self.num_nodes - 1) + row],
            None => 0.0,
        }
    }

    /// The raw solution vector, once solved.
    pub fn solution(&self) -> Option<&DVector<f64>> {
        self.solution.as_ref()
    }

    /// Voltage-source names in branch-row order.
    pub fn vsource_names(&self) -> impl Iterator<Item = &str> {
        self.vsource_rows.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volta_core::NodeId;

    fn two_pin(name: &str, kind: DeviceKind, n1: u32, n2: u32, value: f64) -> Device {
        let mut d = Device::new(name, kind, 0.0, 0.0);
        d.value = value;
        d.set_node_for_pin(0, Some(NodeId::new(n1)));
        d.set_node_for_pin(1, Some(NodeId::new(n2)));
        d
    }

    #[test]
    fn test_voltage_divider() {
        // V1 = 10V into node 1, R1 = R2 = 1k.
        let devices = vec![
            two_pin("V1", DeviceKind::VoltageSource, 1, 0, 10.0),
            two_pin("R1", DeviceKind::Resistor, 1, 2, 1000.0),
            two_pin("R2", DeviceKind::Resistor, 2, 0, 1000.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 3);
        dc.solve().unwrap();

        assert!((dc.node_voltage(1) - 10.0).abs() < 1e-9);
        assert!((dc.node_voltage(2) - 5.0).abs() < 1e-9);
        // 5 mA circulates; the source current reads negative.
        assert!((dc.vsource_current("V1") + 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_current_divider() {
        // 10 mA into node 1 against two parallel 1k resistors.
        let devices = vec![
            two_pin("I1", DeviceKind::CurrentSource, 0, 1, 0.010),
            two_pin("R1", DeviceKind::Resistor, 1, 0, 1000.0),
            two_pin("R2", DeviceKind::Resistor, 1, 0, 1000.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 2);
        dc.solve().unwrap();

        assert!((dc.node_voltage(1) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_inductor_shorts_in_dc() {
        // V1 -- L1 -- node2 -- R1 -- ground: node 2 sits at the source
        // voltage up to the short's residual drop.
        let devices = vec![
            two_pin("V1", DeviceKind::VoltageSource, 1, 0, 5.0),
            two_pin("L1", DeviceKind::Inductor, 1, 2, 1e-3),
            two_pin("R1", DeviceKind::Resistor, 2, 0, 1000.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 3);
        dc.solve().unwrap();

        assert!(
            (dc.node_voltage(2) - 5.0).abs() < 1e-2,
            "V(2) = {}",
            dc.node_voltage(2)
        );
    }

    #[test]
    fn test_diode_piecewise_dc() {
        // V1 -- R1 -- node2 -- D1 -- ground. With the piecewise model,
        // node 2 settles at (g*5 + g*0.7) / (2g) = 2.85 V.
        let devices = vec![
            two_pin("V1", DeviceKind::VoltageSource, 1, 0, 5.0),
            two_pin("R1", DeviceKind::Resistor, 1, 2, 1000.0),
            two_pin("D1", DeviceKind::Diode, 2, 0, 0.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 3);
        dc.solve().unwrap();

        assert!(
            (dc.node_voltage(2) - 2.85).abs() < 1e-6,
            "V(2) = {}",
            dc.node_voltage(2)
        );
    }

    #[test]
    fn test_singular_circuit_reports() {
        // A node with nothing attached to ground anywhere.
        let devices = vec![two_pin("R1", DeviceKind::Resistor, 1, 2, 1000.0)];

        let mut dc = DcAnalysis::new(&devices, 3);
        assert!(dc.solve().is_err());
        // Queries on a failed analysis read 0.
        assert_eq!(dc.node_voltage(1), 0.0);
    }

    #[test]
    fn test_repeat_solve_is_bit_identical() {
        let devices = vec![
            two_pin("V1", DeviceKind::VoltageSource, 1, 0, 10.0),
            two_pin("R1", DeviceKind::Resistor, 1, 2, 2000.0),
            two_pin("R2", DeviceKind::Resistor, 2, 0, 3000.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 3);
        dc.solve().unwrap();
        let first = dc.solution().unwrap().clone();
        dc.solve().unwrap();

        assert_eq!(&first, dc.solution().unwrap());
    }

    #[test]
    fn test_unknown_queries_read_zero() {
        let devices = vec![
            two_pin("V1", DeviceKind::VoltageSource, 1, 0, 10.0),
            two_pin("R1", DeviceKind::Resistor, 1, 0, 1000.0),
        ];

        let mut dc = DcAnalysis::new(&devices, 2);
        dc.solve().unwrap();

        assert_eq!(dc.node_voltage(0), 0.0);
        assert_eq!(dc.node_voltage(99), 0.0);
        assert_eq!(dc.vsource_current("V9"), 0.0);
    }
}
