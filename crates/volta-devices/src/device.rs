//! Schematic components: typed devices with named, positioned pins.

use std::fmt::Write as _;

use volta_core::units::{format_engineering, parse_value};
use volta_core::NodeId;

use crate::diode::DiodeParams;
use crate::error::{Error, Result};
use crate::mosfet::MosfetParams;

/// The closed set of component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    Diode,
    Nmos,
    Pmos,
    Ground,
    OpAmp,
    Npn,
}

impl DeviceKind {
    /// Look up a kind by its schematic type name (`"resistor"`, `"nmosfet"`,
    /// ...). Unknown names yield `None`.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "resistor" => Some(Self::Resistor),
            "capacitor" => Some(Self::Capacitor),
            "inductor" => Some(Self::Inductor),
            "vsource" => Some(Self::VoltageSource),
            "isource" => Some(Self::CurrentSource),
            "diode" => Some(Self::Diode),
            "nmosfet" => Some(Self::Nmos),
            "pmosfet" => Some(Self::Pmos),
            "ground" => Some(Self::Ground),
            "opamp" => Some(Self::OpAmp),
            "npn" => Some(Self::Npn),
            _ => None,
        }
    }

    /// Schematic type name.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Inductor => "inductor",
            Self::VoltageSource => "vsource",
            Self::CurrentSource => "isource",
            Self::Diode => "diode",
            Self::Nmos => "nmosfet",
            Self::Pmos => "pmosfet",
            Self::Ground => "ground",
            Self::OpAmp => "opamp",
            Self::Npn => "npn",
        }
    }

    /// Name prefix used when auto-naming components of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Resistor => "R",
            Self::Capacitor => "C",
            Self::Inductor => "L",
            Self::VoltageSource => "V",
            Self::CurrentSource => "I",
            Self::Diode => "D",
            Self::Nmos | Self::Pmos => "M",
            Self::Ground => "GND",
            Self::OpAmp => "U",
            Self::Npn => "Q",
        }
    }

    /// Pin names in SPICE-line order.
    pub fn pin_names(self) -> &'static [&'static str] {
        match self {
            Self::Resistor | Self::Capacitor | Self::Inductor => &["pin1", "pin2"],
            Self::VoltageSource | Self::CurrentSource => &["positive", "negative"],
            Self::Diode => &["anode", "cathode"],
            Self::Nmos | Self::Pmos => &["drain", "gate", "source", "bulk"],
            Self::Ground => &["gnd"],
            Self::OpAmp => &["non_inv", "inv", "output", "vcc"],
            Self::Npn => &["collector", "base", "emitter"],
        }
    }

    /// Pin offsets relative to the component origin, unrotated.
    pub fn pin_offsets(self) -> &'static [(f64, f64)] {
        match self {
            Self::Resistor | Self::Capacitor | Self::Inductor | Self::Diode => {
                &[(-30.0, 0.0), (30.0, 0.0)]
            }
            Self::VoltageSource | Self::CurrentSource => &[(0.0, -30.0), (0.0, 30.0)],
            Self::Nmos | Self::Pmos => {
                &[(20.0, -30.0), (-30.0, 0.0), (20.0, 30.0), (30.0, 0.0)]
            }
            Self::Ground => &[(0.0, 0.0)],
            Self::OpAmp => &[(-30.0, -15.0), (-30.0, 15.0), (40.0, 0.0), (0.0, -30.0)],
            Self::Npn => &[(20.0, -30.0), (-30.0, 0.0), (20.0, 30.0)],
        }
    }

    /// Number of pins, fixed per kind.
    pub fn pin_count(self) -> usize {
        self.pin_names().len()
    }

    /// Default primary value for a freshly placed component.
    pub fn default_value(self) -> f64 {
        match self {
            Self::Resistor => 1000.0,
            Self::Capacitor => 1e-6,
            Self::Inductor => 1e-6,
            Self::VoltageSource => 5.0,
            Self::CurrentSource => 1e-3,
            _ => 0.0,
        }
    }

    /// Default model name for kinds that are referenced by model.
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            Self::Diode => Some("D"),
            Self::Nmos => Some("NMOS"),
            Self::Pmos => Some("PMOS"),
            Self::OpAmp => Some("OPAMP"),
            Self::Npn => Some("NPN"),
            _ => None,
        }
    }
}

/// Component rotation, in 90-degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// The next 90-degree step.
    pub fn next(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }

    /// Rotate an offset vector about the origin.
    pub fn apply(self, (x, y): (f64, f64)) -> (f64, f64) {
        match self {
            Self::R0 => (x, y),
            Self::R90 => (-y, x),
            Self::R180 => (-x, -y),
            Self::R270 => (y, -x),
        }
    }

    /// Rotation angle in degrees.
    pub fn degrees(self) -> u32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }
}

/// A terminal on a component.
#[derive(Debug, Clone)]
pub struct Pin {
    /// Pin name (from the kind's layout).
    pub name: &'static str,
    /// Unrotated offset from the component origin.
    pub offset: (f64, f64),
    /// Net this pin belongs to; `None` while unconnected.
    pub node: Option<NodeId>,
}

/// Kind-specific nonlinear model parameters.
#[derive(Debug, Clone)]
pub enum ModelParams {
    None,
    Diode(DiodeParams),
    Mosfet(MosfetParams),
}

/// A schematic component.
#[derive(Debug, Clone)]
pub struct Device {
    /// Unique name within the circuit (e.g. "R1").
    pub name: String,
    kind: DeviceKind,
    /// Primary numeric value (ohms, farads, henries, volts, amperes).
    pub value: f64,
    /// Model name for model-referenced kinds.
    pub model: Option<String>,
    /// Component origin in schematic coordinates.
    pub position: (f64, f64),
    rotation: Rotation,
    pins: Vec<Pin>,
    /// Nonlinear model parameters, populated per kind.
    pub params: ModelParams,
}

impl Device {
    /// Create a component of the given kind at a position.
    ///
    /// The ground symbol's single pin is pinned to node 0 from birth; every
    /// other pin starts unconnected.
    pub fn new(name: impl Into<String>, kind: DeviceKind, x: f64, y: f64) -> Self {
        let pinned = if kind == DeviceKind::Ground {
            Some(NodeId::GROUND)
        } else {
            None
        };

        let pins = kind
            .pin_names()
            .iter()
            .zip(kind.pin_offsets())
            .map(|(&name, &offset)| Pin {
                name,
                offset,
                node: pinned,
            })
            .collect();

        let params = match kind {
            DeviceKind::Diode => ModelParams::Diode(DiodeParams::default()),
            DeviceKind::Nmos => ModelParams::Mosfet(MosfetParams::nmos_default()),
            DeviceKind::Pmos => ModelParams::Mosfet(MosfetParams::pmos_default()),
            _ => ModelParams::None,
        };

        Self {
            name: name.into(),
            kind,
            value: kind.default_value(),
            model: kind.default_model().map(str::to_string),
            position: (x, y),
            rotation: Rotation::R0,
            pins,
            params,
        }
    }

    /// The component's type tag.
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// All pins, in SPICE-line order.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Pin name by index.
    pub fn pin_name(&self, pin: usize) -> Option<&'static str> {
        self.pins.get(pin).map(|p| p.name)
    }

    /// Pin offset by index, with the component rotation applied.
    pub fn pin_offset(&self, pin: usize) -> Option<(f64, f64)> {
        self.pins.get(pin).map(|p| self.rotation.apply(p.offset))
    }

    /// Absolute pin position in schematic coordinates.
    pub fn absolute_pin_position(&self, pin: usize) -> Option<(f64, f64)> {
        self.pin_offset(pin)
            .map(|(dx, dy)| (self.position.0 + dx, self.position.1 + dy))
    }

    /// Net the pin belongs to, or `None` while unconnected (or for an
    /// out-of-range index).
    pub fn node_for_pin(&self, pin: usize) -> Option<NodeId> {
        self.pins.get(pin).and_then(|p| p.node)
    }

    /// Assign a pin to a net. Returns `false` for an out-of-range index.
    pub fn set_node_for_pin(&mut self, pin: usize, node: Option<NodeId>) -> bool {
        match self.pins.get_mut(pin) {
            Some(p) => {
                p.node = node;
                true
            }
            None => false,
        }
    }

    /// Current rotation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Rotate the component by 90 degrees. Pin order, node assignments and
    /// parameters are untouched; only the pin offset vectors move.
    pub fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    /// The primary value rendered with its engineering suffix.
    pub fn value_string(&self) -> String {
        format_engineering(self.value)
    }

    /// Set the primary value from a suffixed string.
    pub fn set_value(&mut self, s: &str) -> Result<()> {
        match parse_value(s) {
            Some(v) => {
                self.value = v;
                Ok(())
            }
            None => Err(Error::InvalidValue(s.to_string())),
        }
    }

    /// True when every pin has a net.
    pub fn is_fully_connected(&self) -> bool {
        self.pins.iter().all(|p| p.node.is_some())
    }

    /// Number of pins without a net.
    pub fn unconnected_pin_count(&self) -> usize {
        self.pins.iter().filter(|p| p.node.is_none()).count()
    }

    /// The component's netlist line, node ids in pin order.
    ///
    /// Ground symbols have no line; a component with an unconnected pin
    /// cannot be rendered and yields `None`.
    pub fn spice_line(&self) -> Option<String> {
        if self.kind == DeviceKind::Ground || !self.is_fully_connected() {
            return None;
        }

        let mut line = self.name.clone();
        for pin in &self.pins {
            // Checked above.
            let node = pin.node?;
            write!(line, " {}", node.as_u32()).ok()?;
        }

        match self.kind {
            DeviceKind::Resistor
            | DeviceKind::Capacitor
            | DeviceKind::Inductor
            | DeviceKind::VoltageSource
            | DeviceKind::CurrentSource => {
                write!(line, " {}", self.value_string()).ok()?;
            }
            DeviceKind::Diode
            | DeviceKind::Nmos
            | DeviceKind::Pmos
            | DeviceKind::OpAmp
            | DeviceKind::Npn => {
                write!(line, " {}", self.model.as_deref().unwrap_or("?")).ok()?;
            }
            DeviceKind::Ground => unreachable!(),
        }

        Some(line)
    }
}
