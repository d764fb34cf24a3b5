//! Netlist parser: token lines to devices and analysis requests.

use indexmap::IndexMap;
use volta_core::units::parse_value;
use volta_core::NodeId;
use volta_devices::{Device, DeviceKind};

use crate::error::{Error, Result};
use crate::lexer;
use crate::types::{AcSweepType, AnalysisCommand};

/// Everything a netlist describes: the device list with dense node ids, the
/// node count (ground included), and the analysis requests in order.
#[derive(Debug)]
pub struct ParseResult {
    pub devices: Vec<Device>,
    /// Number of distinct nodes, ground included.
    pub num_nodes: usize,
    pub analyses: Vec<AnalysisCommand>,
}

/// Parse netlist text.
///
/// Malformed element lines and directives are logged and skipped; parsing
/// never fails on content.
pub fn parse(input: &str) -> ParseResult {
    let lines = lexer::fold_continuations(input.lines().map(str::to_string));
    let mut parser = Parser::new();
    parser.run(&lines);
    parser.finish()
}

/// Read and parse a netlist file.
pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<ParseResult> {
    let lines = lexer::load_lines(path)?;
    let mut parser = Parser::new();
    parser.run(&lines);
    Ok(parser.finish())
}

struct Parser {
    /// Case-insensitive node-name table, in first-seen order.
    node_map: IndexMap<String, NodeId>,
    /// Distinct node count, ground counted once.
    num_nodes: usize,
    devices: Vec<Device>,
    analyses: Vec<AnalysisCommand>,
}

impl Parser {
    fn new() -> Self {
        let mut node_map = IndexMap::new();
        node_map.insert("0".to_string(), NodeId::GROUND);
        node_map.insert("gnd".to_string(), NodeId::GROUND);
        node_map.insert("ground".to_string(), NodeId::GROUND);

        Self {
            node_map,
            num_nodes: 1,
            devices: Vec::new(),
            analyses: Vec::new(),
        }
    }

    fn run(&mut self, lines: &[String]) {
        for (line_no, line) in lines.iter().enumerate() {
            let tokens = lexer::tokenize_line(line);
            if tokens.is_empty() {
                continue;
            }

            let outcome = if tokens[0].starts_with('.') {
                self.parse_directive(&tokens, line_no + 1)
            } else {
                self.parse_element(&tokens, line_no + 1)
            };

            match outcome {
                Ok(true) => {}
                Ok(false) => break, // .end
                Err(e) => log::warn!("{}", e),
            }
        }
    }

    fn finish(self) -> ParseResult {
        ParseResult {
            devices: self.devices,
            num_nodes: self.num_nodes,
            analyses: self.analyses,
        }
    }

    /// Resolve a node name, assigning the next sequential id to fresh ones.
    fn node(&mut self, name: &str) -> NodeId {
        let key = name.to_lowercase();
        if let Some(&id) = self.node_map.get(&key) {
            return id;
        }
        let id = NodeId::new(self.num_nodes as u32);
        self.num_nodes += 1;
        self.node_map.insert(key, id);
        id
    }

    fn value(&self, token: &str) -> Result<f64> {
        parse_value(token).ok_or_else(|| Error::InvalidValue(token.to_string()))
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// Dispatch an element line on the case-folded first character of its
    /// name. Returns `Ok(true)` to continue with the next line.
    fn parse_element(&mut self, tokens: &[String], line: usize) -> Result<bool> {
        let name = &tokens[0];
        let initial = name
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or_default();

        match initial {
            'r' => self.parse_two_terminal(tokens, line, DeviceKind::Resistor)?,
            'c' => self.parse_two_terminal(tokens, line, DeviceKind::Capacitor)?,
            'l' => self.parse_two_terminal(tokens, line, DeviceKind::Inductor)?,
            'v' => self.parse_vsource(tokens, line)?,
            'd' => self.parse_diode(tokens, line)?,
            'm' => self.parse_mosfet(tokens, line)?,
            _ => {
                log::warn!("line {}: unknown component type in '{}'", line, name);
            }
        }

        Ok(true)
    }

    fn parse_two_terminal(
        &mut self,
        tokens: &[String],
        line: usize,
        kind: DeviceKind,
    ) -> Result<()> {
        if tokens.len() < 4 {
            return Err(Error::Parse {
                line,
                message: format!("{} needs <name> <n1> <n2> <value>", kind.type_name()),
            });
        }

        let value = self.value(&tokens[3])?;
        let n1 = self.node(&tokens[1]);
        let n2 = self.node(&tokens[2]);

        let mut device = Device::new(tokens[0].clone(), kind, 0.0, 0.0);
        device.value = value;
        device.set_node_for_pin(0, Some(n1));
        device.set_node_for_pin(1, Some(n2));
        self.devices.push(device);
        Ok(())
    }

    /// `V<name> <n+> <n-> [DC] <value>`
    fn parse_vsource(&mut self, tokens: &[String], line: usize) -> Result<()> {
        if tokens.len() < 4 {
            return Err(Error::Parse {
                line,
                message: "voltage source needs <name> <n+> <n-> <value>".to_string(),
            });
        }

        let value_token = if tokens[3].eq_ignore_ascii_case("dc") {
            tokens.get(4).ok_or(Error::Parse {
                line,
                message: "missing value after DC keyword".to_string(),
            })?
        } else {
            &tokens[3]
        };
        let value = self.value(value_token)?;

        let n_pos = self.node(&tokens[1]);
        let n_neg = self.node(&tokens[2]);

        let mut device = Device::new(tokens[0].clone(), DeviceKind::VoltageSource, 0.0, 0.0);
        device.value = value;
        device.set_node_for_pin(0, Some(n_pos));
        device.set_node_for_pin(1, Some(n_neg));
        self.devices.push(device);
        Ok(())
    }

    /// `D<name> <anode> <cathode> <model>`
    fn parse_diode(&mut self, tokens: &[String], line: usize) -> Result<()> {
        if tokens.len() < 4 {
            return Err(Error::Parse {
                line,
                message: "diode needs <name> <anode> <cathode> <model>".to_string(),
            });
        }

        let anode = self.node(&tokens[1]);
        let cathode = self.node(&tokens[2]);

        let mut device = Device::new(tokens[0].clone(), DeviceKind::Diode, 0.0, 0.0);
        device.model = Some(tokens[3].clone());
        device.set_node_for_pin(0, Some(anode));
        device.set_node_for_pin(1, Some(cathode));
        self.devices.push(device);
        Ok(())
    }

    /// `M<name> <drain> <gate> <source> <bulk> <model>`
    ///
    /// The device is PMOS when the model token contains `pmos` or `pfet`,
    /// NMOS otherwise.
    fn parse_mosfet(&mut self, tokens: &[String], line: usize) -> Result<()> {
        if tokens.len() < 6 {
            return Err(Error::Parse {
                line,
                message: "mosfet needs <name> <d> <g> <s> <b> <model>".to_string(),
            });
        }

        let model = tokens[5].clone();
        let lower = model.to_lowercase();
        let kind = if lower.contains("pmos") || lower.contains("pfet") {
            DeviceKind::Pmos
        } else {
            DeviceKind::Nmos
        };

        let nodes = [
            self.node(&tokens[1]),
            self.node(&tokens[2]),
            self.node(&tokens[3]),
            self.node(&tokens[4]),
        ];

        let mut device = Device::new(tokens[0].clone(), kind, 0.0, 0.0);
        device.model = Some(model);
        for (pin, node) in nodes.into_iter().enumerate() {
            device.set_node_for_pin(pin, Some(node));
        }
        self.devices.push(device);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    /// Returns `Ok(false)` for `.end`, `Ok(true)` otherwise.
    fn parse_directive(&mut self, tokens: &[String], line: usize) -> Result<bool> {
        let directive = tokens[0].to_lowercase();

        match directive.as_str() {
            ".end" => return Ok(false),
            ".op" => self.analyses.push(AnalysisCommand::Op),
            ".dc" => {
                if tokens.len() == 1 {
                    // Bare .dc is an operating-point request.
                    self.analyses.push(AnalysisCommand::Op);
                } else if tokens.len() >= 5 {
                    self.analyses.push(AnalysisCommand::DcSweep {
                        source: tokens[1].clone(),
                        start: self.value(&tokens[2])?,
                        stop: self.value(&tokens[3])?,
                        step: self.value(&tokens[4])?,
                    });
                } else {
                    return Err(Error::Parse {
                        line,
                        message: "usage: .dc <src> <start> <stop> <step>".to_string(),
                    });
                }
            }
            ".tran" => {
                if tokens.len() < 3 {
                    return Err(Error::Parse {
                        line,
                        message: "usage: .tran <step> <stop> [start]".to_string(),
                    });
                }
                let tstep = self.value(&tokens[1])?;
                let tstop = self.value(&tokens[2])?;
                let tstart = match tokens.get(3) {
                    Some(t) => self.value(t)?,
                    None => 0.0,
                };
                self.analyses.push(AnalysisCommand::Tran {
                    tstep,
                    tstop,
                    tstart,
                });
            }
            ".ac" => {
                if tokens.len() < 5 {
                    return Err(Error::Parse {
                        line,
                        message: "usage: .ac <dec|oct|lin> <points> <fstart> <fstop>".to_string(),
                    });
                }
                let sweep_type = match tokens[1].to_lowercase().as_str() {
                    "dec" => AcSweepType::Dec,
                    "oct" => AcSweepType::Oct,
                    "lin" => AcSweepType::Lin,
                    other => {
                        return Err(Error::Parse {
                            line,
                            message: format!("unknown AC sweep type '{}'", other),
                        });
                    }
                };
                let num_points = tokens[2].parse().map_err(|_| Error::Parse {
                    line,
                    message: format!("invalid point count '{}'", tokens[2]),
                })?;
                self.analyses.push(AnalysisCommand::Ac {
                    sweep_type,
                    num_points,
                    fstart: self.value(&tokens[3])?,
                    fstop: self.value(&tokens[4])?,
                });
            }
            other => {
                log::warn!("line {}: unknown directive '{}'", line, other);
            }
        }

        Ok(true)
    }
}
