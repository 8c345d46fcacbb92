use serde::{Deserialize, Serialize};

/// Tuning parameters for chain construction and shear fitting.
///
/// All tolerances are expressed in pixels or as dimensionless ratios of the
/// segment geometry. Out-of-range values are clamped on use rather than
/// rejected: negative tolerances collapse to zero, `srtol` is confined to
/// `[0, 1]`, `drmin`/`drmax` are swapped into order, and the length bounds
/// are forced to `2 <= lmin <= lmax`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChainOptions {
    /// Absolute tolerance on character height (pixels).
    pub satol: f64,
    /// Relative tolerance on character height.
    pub srtol: f64,
    /// Minimum horizontal spacing between characters, relative to their size.
    pub drmin: f64,
    /// Maximum horizontal spacing between characters, relative to their size.
    pub drmax: f64,
    /// Maximum tangent of the angle between a chain and the horizontal.
    pub slope: f64,
    /// Absolute residual tolerance of vertical alignment (pixels).
    pub aatol: f64,
    /// Vertical-alignment residual tolerance relative to the mean height.
    pub artol: f64,
    /// Convergence tolerance of the shear fits (pixels).
    pub prec: f64,
    /// Minimum chain length in segments.
    pub lmin: usize,
    /// Maximum chain length in segments.
    pub lmax: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            satol: 2.0,
            srtol: 0.05,
            drmin: 0.4,
            drmax: 2.5,
            slope: 0.3,
            aatol: 2.0,
            artol: 0.05,
            prec: 0.05,
            lmin: 3,
            lmax: 10,
        }
    }
}

impl ChainOptions {
    pub(super) fn tuning(&self) -> Tuning {
        let satol = self.satol.max(0.0);
        let srtol = self.srtol.clamp(0.0, 1.0);
        let mut drmin = self.drmin.max(0.0);
        let mut drmax = self.drmax.max(0.0);
        if drmax < drmin {
            std::mem::swap(&mut drmin, &mut drmax);
        }
        let lmin = self.lmin.max(2);
        Tuning {
            sa: 1.0 + 2.0 * satol,
            sq: 2.0 - srtol,
            sr: 2.0 + srtol,
            rmin: 0.5 * drmin,
            rmax: 0.5 * drmax,
            slope: self.slope.max(0.0),
            aatol: self.aatol.max(0.0),
            artol: self.artol.max(0.0),
            prec: self.prec.max(0.0),
            lmin,
            lmax: self.lmax.max(lmin),
        }
    }
}

/// Clamped options with the derived height-range coefficients precomputed.
#[derive(Clone, Copy, Debug)]
pub(super) struct Tuning {
    pub sa: f64,
    pub sq: f64,
    pub sr: f64,
    pub rmin: f64,
    pub rmax: f64,
    pub slope: f64,
    pub aatol: f64,
    pub artol: f64,
    pub prec: f64,
    pub lmin: usize,
    pub lmax: usize,
}
