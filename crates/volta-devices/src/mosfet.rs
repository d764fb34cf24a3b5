//! MOSFET level-1 (square-law) model.
//!
//! Good enough for hand calculations and teaching-grade simulation; the
//! operating region is decided from `(Vgs, Vds)` against the threshold
//! voltage and the drain current carries channel-length modulation.

/// MOSFET polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosfetType {
    Nmos,
    Pmos,
}

/// Operating region of the MOSFET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MosfetRegion {
    Cutoff,
    Triode,
    Saturation,
}

/// Minimum output conductance, for numerical stability.
const GMIN: f64 = 1e-12;

/// Level-1 model parameters.
#[derive(Debug, Clone)]
pub struct MosfetParams {
    /// Threshold voltage (V). Negative for PMOS.
    pub vto: f64,
    /// Transconductance parameter (A/V^2).
    pub kp: f64,
    /// Channel-length modulation (1/V).
    pub lambda: f64,
    /// Channel width (m).
    pub w: f64,
    /// Channel length (m).
    pub l: f64,
}

impl MosfetParams {
    /// Default NMOS parameters.
    pub fn nmos_default() -> Self {
        Self {
            vto: 0.7,
            kp: 100e-6,
            lambda: 0.01,
            w: 10e-6,
            l: 1e-6,
        }
    }

    /// Default PMOS parameters.
    pub fn pmos_default() -> Self {
        Self {
            vto: -0.7,
            kp: 50e-6,
            lambda: 0.01,
            w: 10e-6,
            l: 1e-6,
        }
    }

    /// Effective transconductance factor: beta = kp * W / L.
    pub fn beta(&self) -> f64 {
        self.kp * self.w / self.l
    }

    /// Evaluate drain current and partial derivatives at `(vgs, vds)`.
    ///
    /// For NMOS:
    /// - Cutoff:     `Vgs <  Vth` -> `Ids = 0`
    /// - Triode:     `Vds <  Vgs - Vth` -> `Ids = beta ((Vgs-Vth) Vds - Vds^2/2)(1 + lambda Vds)`
    /// - Saturation: otherwise -> `Ids = beta/2 (Vgs-Vth)^2 (1 + lambda Vds)`
    ///
    /// PMOS is evaluated as the mirror in source-referenced voltages: the
    /// inputs are negated, and the returned current changes sign.
    ///
    /// Returns `(ids, gds, gm, region)` where `gm = dIds/dVgs` and
    /// `gds = dIds/dVds`.
    pub fn evaluate(
        &self,
        mos_type: MosfetType,
        vgs: f64,
        vds: f64,
    ) -> (f64, f64, f64, MosfetRegion) {
        let (vgs, vds) = match mos_type {
            MosfetType::Nmos => (vgs, vds),
            MosfetType::Pmos => (-vgs, -vds),
        };

        let vth = self.vto.abs();
        let beta = self.beta();
        let lambda = self.lambda;

        if vgs < vth {
            return (0.0, GMIN, 0.0, MosfetRegion::Cutoff);
        }

        let vov = vgs - vth;
        let (ids, gds, gm, region) = if vds < vov {
            let ids = beta * (vov * vds - 0.5 * vds * vds) * (1.0 + lambda * vds);
            let gds = beta * (vov - vds) * (1.0 + lambda * vds)
                + beta * (vov * vds - 0.5 * vds * vds) * lambda;
            let gm = beta * vds * (1.0 + lambda * vds);
            (ids, gds, gm, MosfetRegion::Triode)
        } else {
            let ids = 0.5 * beta * vov * vov * (1.0 + lambda * vds);
            let gds = 0.5 * beta * vov * vov * lambda;
            let gm = beta * vov * (1.0 + lambda * vds);
            (ids, gds, gm, MosfetRegion::Saturation)
        };

        let ids = match mos_type {
            MosfetType::Nmos => ids,
            MosfetType::Pmos => -ids,
        };

        (ids, gds.max(GMIN), gm, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff() {
        let p = MosfetParams::nmos_default();

        let (ids, gds, gm, region) = p.evaluate(MosfetType::Nmos, 0.3, 1.0);
        assert_eq!(region, MosfetRegion::Cutoff);
        assert_eq!(ids, 0.0);
        assert_eq!(gm, 0.0);
        assert_eq!(gds, 1e-12);
    }

    #[test]
    fn test_saturation() {
        let p = MosfetParams::nmos_default();

        // Vgs = 2, Vds = 2: Vov = 1.3, Vds >= Vov -> saturation.
        let (ids, gds, gm, region) = p.evaluate(MosfetType::Nmos, 2.0, 2.0);
        assert_eq!(region, MosfetRegion::Saturation);

        let beta = p.beta();
        let expected = 0.5 * beta * 1.3 * 1.3 * (1.0 + 0.01 * 2.0);
        assert!((ids - expected).abs() < 1e-12, "ids = {}", ids);

        let expected_gm = beta * 1.3 * (1.0 + 0.01 * 2.0);
        assert!((gm - expected_gm).abs() < 1e-12, "gm = {}", gm);

        let expected_gds = 0.5 * beta * 1.3 * 1.3 * 0.01;
        assert!((gds - expected_gds).abs() < 1e-12, "gds = {}", gds);
    }

    #[test]
    fn test_triode() {
        let p = MosfetParams::nmos_default();

        // Vgs = 3, Vds = 0.5: Vov = 2.3 > Vds -> triode.
        let (ids, _gds, _gm, region) = p.evaluate(MosfetType::Nmos, 3.0, 0.5);
        assert_eq!(region, MosfetRegion::Triode);

        let beta = p.beta();
        let expected = beta * (2.3 * 0.5 - 0.5 * 0.25) * (1.0 + 0.01 * 0.5);
        assert!((ids - expected).abs() < 1e-12, "ids = {}", ids);
    }

    #[test]
    fn test_pmos_mirror() {
        let p = MosfetParams::pmos_default();

        // PMOS on: Vgs = -2, Vds = -2 mirrors to (2, 2) in the flipped frame.
        let (ids, _gds, gm, region) = p.evaluate(MosfetType::Pmos, -2.0, -2.0);
        assert_eq!(region, MosfetRegion::Saturation);
        assert!(ids < 0.0, "PMOS drain current is negative: {}", ids);
        assert!(gm > 0.0);

        // PMOS off for positive Vgs.
        let (ids, _, _, region) = p.evaluate(MosfetType::Pmos, 1.0, -2.0);
        assert_eq!(region, MosfetRegion::Cutoff);
        assert_eq!(ids, 0.0);
    }

    #[test]
    fn test_region_boundary() {
        let p = MosfetParams::nmos_default();

        // Exactly Vds = Vov sits in saturation.
        let (_, _, _, region) = p.evaluate(MosfetType::Nmos, 2.0, 1.3);
        assert_eq!(region, MosfetRegion::Saturation);
    }
}
