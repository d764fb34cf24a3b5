//! Diode model using the Shockley equation with a reverse clamp.

/// Minimum conductance reported by the model, for numerical stability.
const GMIN: f64 = 1e-12;

/// Diode model parameters.
#[derive(Debug, Clone)]
pub struct DiodeParams {
    /// Saturation current (A).
    pub is: f64,
    /// Emission coefficient.
    pub n: f64,
    /// Thermal voltage (V).
    pub vt: f64,
}

impl Default for DiodeParams {
    fn default() -> Self {
        Self {
            is: 1e-14,
            n: 1.0,
            vt: 0.026,
        }
    }
}

impl DiodeParams {
    /// Evaluate diode current and conductance at voltage `vd` (anode
    /// relative to cathode).
    ///
    /// For `vd >= -5 n Vt`:
    /// - `I(V) = Is * (exp(V / (n Vt)) - 1)`
    /// - `g(V) = dI/dV = Is / (n Vt) * exp(V / (n Vt))`
    ///
    /// Below the clamp the diode is in deep reverse bias: `I = -Is` with
    /// the minimum conductance.
    pub fn evaluate(&self, vd: f64) -> (f64, f64) {
        let nvt = self.n * self.vt;

        if vd < -5.0 * nvt {
            return (-self.is, GMIN);
        }

        // Limit large forward voltages to keep exp() finite.
        let vd = self.limit_voltage(vd, nvt);

        let exp_term = (vd / nvt).exp();
        let id = self.is * (exp_term - 1.0);
        let gd = (self.is * exp_term / nvt).max(GMIN);

        (id, gd)
    }

    /// Log-compress voltages beyond the critical voltage so the exponential
    /// stays representable.
    fn limit_voltage(&self, vd: f64, nvt: f64) -> f64 {
        let vcrit = nvt * (nvt / (std::f64::consts::SQRT_2 * self.is)).ln();

        if vd > vcrit {
            let arg = (vd - vcrit) / nvt;
            vcrit + nvt * (1.0 + arg.ln_1p())
        } else {
            vd
        }
    }
}
