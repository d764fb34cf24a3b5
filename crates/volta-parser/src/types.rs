//! Public types for the netlist parser.

/// AC sweep spacing parsed from a `.ac` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcSweepType {
    /// Logarithmic, points per decade.
    Dec,
    /// Logarithmic, points per octave.
    Oct,
    /// Linear spacing.
    Lin,
}

/// An analysis request parsed from the netlist.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisCommand {
    /// DC operating point (`.op`, or `.dc` without sweep arguments).
    Op,
    /// DC sweep (`.dc <src> <start> <stop> <step>`). Recognized; execution
    /// is left to an external collaborator.
    DcSweep {
        source: String,
        start: f64,
        stop: f64,
        step: f64,
    },
    /// Transient analysis (`.tran <step> <stop> [start]`).
    Tran { tstep: f64, tstop: f64, tstart: f64 },
    /// AC sweep (`.ac <dec|oct|lin> <points> <fstart> <fstop>`).
    /// Recognized; not implemented by the engine.
    Ac {
        sweep_type: AcSweepType,
        num_points: usize,
        fstart: f64,
        fstop: f64,
    },
}
