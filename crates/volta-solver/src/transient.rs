//! Transient analysis: backward-Euler time stepping.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use nalgebra::DVector;
use volta_core::MnaSystem;
use volta_devices::{Device, DeviceKind};

use crate::dc::index_voltage_sources;
use crate::error::Result;
use crate::linear::solve_dense;
use crate::stamp;

/// Time-stepping settings from a `.tran` directive.
#[derive(Debug, Clone)]
pub struct TransientSettings {
    /// Time step (s).
    pub tstep: f64,
    /// Stop time (s).
    pub tstop: f64,
    /// Start time (s).
    pub tstart: f64,
}

impl TransientSettings {
    pub fn new(tstep: f64, tstop: f64) -> Self {
        Self {
            tstep,
            tstop,
            tstart: 0.0,
        }
    }
}

/// One recorded instant of a transient run.
#[derive(Debug, Clone)]
pub struct TimePoint {
    /// Time (s).
    pub time: f64,
    /// Node voltages indexed by node id; entry 0 (ground) is 0.0.
    pub node_voltages: Vec<f64>,
    /// Branch currents keyed by voltage-source name.
    pub branch_currents: HashMap<String, f64>,
}

/// A backward-Euler transient analysis over a borrowed device list.
///
/// Reactive elements start from the zero state (discharged capacitors,
/// zero inductor current) and become companion models (`G_eq` in parallel
/// with a history source) at every step; nonlinear devices are linearized
/// once per step around the previous solution. The result log grows one
/// [`TimePoint`] per step, in strictly increasing time order, and survives
/// a mid-run solver failure.
#[derive(Debug)]
pub struct TransientAnalysis<'a> {
    devices: &'a [Device],
    /// Node count, ground included.
    num_nodes: usize,
    settings: TransientSettings,
    vsource_rows: IndexMap<String, usize>,
    /// Device indices of the inductors, aligned with `inductor_currents`.
    inductors: Vec<usize>,
    /// Per-inductor current history (A), pin1 -> pin2.
    inductor_currents: Vec<f64>,
    x_prev: DVector<f64>,
    results: Vec<TimePoint>,
}

impl<'a> TransientAnalysis<'a> {
    pub fn new(devices: &'a [Device], num_nodes: usize, settings: TransientSettings) -> Self {
        let num_nodes = num_nodes.max(1);
        let vsource_rows = index_voltage_sources(devices);
        let inductors: Vec<usize> = devices
            .iter()
            .enumerate()
            .filter(|(_, d)| d.kind() == DeviceKind::Inductor)
            .map(|(i, _)| i)
            .collect();
        let size = (num_nodes - 1) + vsource_rows.len();

        Self {
            devices,
            num_nodes,
            settings,
            vsource_rows,
            inductor_currents: vec![0.0; inductors.len()],
            inductors,
            x_prev: DVector::zeros(size),
            results: Vec::new(),
        }
    }

    /// Run the analysis.
    ///
    /// The start time records the zero initial state; each subsequent step
    /// rebuilds the system with companion models around the previous
    /// solution and solves it. A singular system aborts with an error;
    /// time points recorded before the failure stay available.
    pub fn solve(&mut self) -> Result<()> {
        self.results.clear();
        self.x_prev.fill(0.0);
        self.inductor_currents.fill(0.0);

        self.save_time_point(self.settings.tstart);

        let h = self.settings.tstep;
        let num_steps = ((self.settings.tstop - self.settings.tstart) / h).round() as usize;

        for step in 1..=num_steps {
            let t = self.settings.tstart + step as f64 * h;

            let mna = self.build_system(h);
            let x = solve_dense(mna.matrix(), mna.rhs())?;

            // Advance the inductor current histories.
            for (k, &device_idx) in self.inductors.iter().enumerate() {
                let device = &self.devices[device_idx];
                let v = voltage_across_solution(&x, device);
                self.inductor_currents[k] += h / device.value * v;
            }

            self.x_prev = x;
            self.save_time_point(t);
        }

        log::debug!(
            "transient analysis finished: {} time points",
            self.results.len()
        );
        Ok(())
    }

    fn build_system(&self, h: f64) -> MnaSystem {
        let mut mna = MnaSystem::new(self.num_nodes - 1, self.vsource_rows.len());
        let mut inductor_slot = 0;

        for device in self.devices {
            let i = stamp::pin_index(device, 0);
            let j = stamp::pin_index(device, 1);

            match device.kind() {
                DeviceKind::Capacitor => {
                    let v_prev = self.voltage_across(device);
                    stamp::stamp_capacitor_be(&mut mna, i, j, device.value, h, v_prev);
                }
                DeviceKind::Inductor => {
                    let i_prev = self.inductor_currents[inductor_slot];
                    inductor_slot += 1;
                    stamp::stamp_inductor_be(&mut mna, i, j, device.value, h, i_prev);
                }
                DeviceKind::Diode => {
                    let v_prev = self.voltage_across(device);
                    stamp::stamp_diode_linearized(&mut mna, device, v_prev);
                }
                DeviceKind::Nmos | DeviceKind::Pmos => {
                    let vd = self.node_voltage_prev(device, 0);
                    let vg = self.node_voltage_prev(device, 1);
                    let vs = self.node_voltage_prev(device, 2);
                    stamp::stamp_mosfet_linearized(&mut mna, device, vg - vs, vd - vs);
                }
                _ => {
                    // Resistors and sources keep their DC stamp; voltage
                    // sources hold their DC value over time.
                    let row = self.vsource_rows.get(&device.name).copied();
                    stamp::stamp_dc(device, &mut mna, row);
                }
            }
        }

        mna
    }

    /// Previous-step voltage across a two-pin device (pin 0 minus pin 1).
    fn voltage_across(&self, device: &Device) -> f64 {
        voltage_across_solution(&self.x_prev, device)
    }

    /// Previous-step voltage at one of a device's pins.
    fn node_voltage_prev(&self, device: &Device, pin: usize) -> f64 {
        match stamp::pin_index(device, pin) {
            Some(idx) => self.x_prev[idx],
            None => 0.0,
        }
    }

    fn save_time_point(&mut self, time: f64) {
        let mut node_voltages = vec![0.0; self.num_nodes];
        for node in 1..self.num_nodes {
            node_voltages[node] = self.x_prev[node - 1];
        }

        let branch_currents = self
            .vsource_rows
            .iter()
            .map(|(name, &row)| (name.clone(), self.x_prev[(self.num_nodes - 1) + row]))
            .collect();

        self.results.push(TimePoint {
            time,
            node_voltages,
            branch_currents,
        });
    }

    // ------------------------------------------------------------------
    // Result queries
    // ------------------------------------------------------------------

    /// Voltage at node `k` in the latest solution. Ground and out-of-range
    /// nodes read 0.0.
    pub fn node_voltage(&self, node: u32) -> f64 {
        if node == 0 || (node as usize) >= self.num_nodes {
            return 0.0;
        }
        self.x_prev[(node - 1) as usize]
    }

    /// Latest branch current through a named voltage source, or 0.0.
    pub fn vsource_current(&self, name: &str) -> f64 {
        match self.vsource_rows.get(name) {
            Some(&row) => self.x_prev[(self.num_nodes - 1) + row],
            None => 0.0,
        }
    }

    /// The recorded time points, in increasing time order.
    pub fn time_points(&self) -> &[TimePoint] {
        &self.results
    }

    /// Voltage history of node `k` across the run.
    pub fn node_voltage_history(&self, node: u32) -> Vec<f64> {
        self.results
            .iter()
            .map(|p| p.node_voltages.get(node as usize).copied().unwrap_or(0.0))
            .collect()
    }

    /// Export the run as CSV: `Time,Node1,...,NodeM`, time in scientific
    /// notation, voltages with six decimals.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);

        write!(file, "Time")?;
        for node in 1..self.num_nodes {
            write!(file, ",Node{}", node)?;
        }
        writeln!(file)?;

        for point in &self.results {
            write!(file, "{:e}", point.time)?;
            for node in 1..self.num_nodes {
                write!(file, ",{:.6}", point.node_voltages[node])?;
            }
            writeln!(file)?;
        }

        file.flush()?;
        Ok(())
    }
}

/// Voltage across a two-pin device (pin 0 minus pin 1) in a solution.
fn voltage_across_solution(x: &DVector<f64>, device: &Device) -> f64 {
    let vp = stamp::pin_index(device, 0).map(|i| x[i]).unwrap_or(0.0);
    let vn = stamp::pin_index(device, 1).map(|i| x[i]).unwrap_or(0.0);
    vp - vn
}
