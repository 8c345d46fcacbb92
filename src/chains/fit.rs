use nalgebra::{Matrix2, Vector2};

use super::options::Tuning;
use super::Chain;
use crate::error::{Error, Result};
use crate::links::INTERIOR;
use crate::segmentation::{Point, Segment, Segmentation};

const MAX_VERTICAL_ITER: usize = 10;

pub(super) struct LineFit {
    pub xm: f64,
    pub ym: f64,
    pub alpha: f64,
}

/// Weighted first-order regression `y = ym + alpha * (x - xm)`.
///
/// Takes the running sums of weights, weighted abscissae/ordinates and their
/// products; reports [`Error::Singular`] when there are no points or no
/// horizontal spread (a vertical line, possibly from rounding).
pub(super) fn fit_line(sw: f64, swx: f64, swy: f64, swxx: f64, swxy: f64) -> Result<LineFit> {
    if sw <= 0.0 {
        return Err(Error::Singular);
    }
    let q = 1.0 / sw;
    let xm = swx * q;
    let ym = swy * q;
    let r = swxx * q - xm * xm;
    if r <= 0.0 {
        return Err(Error::Singular);
    }
    Ok(LineFit {
        xm,
        ym,
        alpha: (swxy * q - xm * ym) / r,
    })
}

/// Running sums of a line fit over the centres of a chain's segments.
///
/// Candidates are tested against the regression through the member centres
/// plus the candidate itself: the fit must stay below the slope limit and the
/// worst vertical residual, at the candidate and at every member, must stay
/// within `aatol + artol * mean_height`. Coordinates are taken relative to
/// the mean position to limit rounding errors.
pub(super) struct ShortLine<'a> {
    sgm: &'a Segmentation,
    members: &'a [u32],
    sh: f64,
    sx: f64,
    sy: f64,
    sxx: f64,
    sxy: f64,
}

impl<'a> ShortLine<'a> {
    pub(super) fn new(sgm: &'a Segmentation, members: &'a [u32]) -> Self {
        let mut sh = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for &j in members {
            let s = &sgm.segments()[j as usize];
            sh += s.height as f64;
            sx += s.xcen;
            sy += s.ycen;
            sxx += s.xcen * s.xcen;
            sxy += s.xcen * s.ycen;
        }
        Self {
            sgm,
            members,
            sh,
            sx,
            sy,
            sxx,
            sxy,
        }
    }

    pub(super) fn accepts(&self, candidate: &Segment, t: &Tuning) -> bool {
        let x = candidate.xcen;
        let y = candidate.ycen;
        let h = candidate.height as f64;
        let np1 = self.members.len() as f64 + 1.0;
        let fit = match fit_line(
            np1,
            self.sx + x,
            self.sy + y,
            self.sxx + x * x,
            self.sxy + x * y,
        ) {
            Ok(fit) if fit.alpha.abs() <= t.slope => fit,
            _ => return false,
        };

        let hm = (self.sh + h) / np1;
        let threshold = t.aatol + t.artol * hm;

        let residual = (fit.alpha * (x - fit.xm) - (y - fit.ym)).abs();
        if residual > threshold {
            return false;
        }
        for &j in self.members {
            let s = &self.sgm.segments()[j as usize];
            let residual = (fit.alpha * (s.xcen - fit.xm) - (s.ycen - fit.ym)).abs();
            if residual > threshold {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(super) struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    #[inline]
    fn merge(&mut self, other: &Bbox) {
        if other.xmin < self.xmin {
            self.xmin = other.xmin;
        }
        if other.xmax > self.xmax {
            self.xmax = other.xmax;
        }
        if other.ymin < self.ymin {
            self.ymin = other.ymin;
        }
        if other.ymax > self.ymax {
            self.ymax = other.ymax;
        }
    }
}

/// Bounding box of a segment's boundary points under a 2x2 transform.
///
/// The first point seeds the extrema; later points contribute only when
/// their link mask shows they sit on the region boundary. An empty point
/// list yields the zero box.
pub(super) fn transformed_bbox(points: &[Point], a: &Matrix2<f64>) -> Bbox {
    let Some(seed) = points.first() else {
        return Bbox::default();
    };
    let p = a * Vector2::new(seed.x as f64, seed.y as f64);
    let mut b = Bbox {
        xmin: p.x,
        xmax: p.x,
        ymin: p.y,
        ymax: p.y,
    };
    for pt in &points[1..] {
        if pt.link & INTERIOR == INTERIOR {
            continue;
        }
        let q = a * Vector2::new(pt.x as f64, pt.y as f64);
        if q.x < b.xmin {
            b.xmin = q.x;
        }
        if q.x > b.xmax {
            b.xmax = q.x;
        }
        if q.y < b.ymin {
            b.ymin = q.y;
        }
        if q.y > b.ymax {
            b.ymax = q.y;
        }
    }
    b
}

/// Fit both shears of a freshly materialised chain.
pub(super) fn fit_chain(chain: &mut Chain, sgm: &Segmentation, prec: f64) -> Result<()> {
    fit_vertical_shear(chain, sgm, prec)?;
    fit_horizontal_shear(chain, sgm);
    Ok(())
}

/// Adjust the vertical shear to align the transformed bounding boxes of the
/// chained segments.
///
/// Each round regresses the box centres and folds the resulting slope into
/// the shear; the first round uses the raw (untransformed) boxes and segment
/// centres. Convergence requires the latest slope to fall below the fit
/// precision divided by the lever arm (the chain width); at least one round
/// always runs and the round count is capped.
fn fit_vertical_shear(chain: &mut Chain, sgm: &Segmentation, prec: f64) -> Result<()> {
    let length = chain.segments.len();
    let mut iter = 0usize;
    loop {
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut total = Bbox::default();
        if iter == 0 {
            for (k, &j) in chain.segments.iter().enumerate() {
                let s = &sgm.segments()[j as usize];
                let b = Bbox {
                    xmin: s.xmin as f64,
                    xmax: s.xmax as f64,
                    ymin: s.ymin as f64,
                    ymax: s.ymax as f64,
                };
                if k == 0 {
                    total = b;
                } else {
                    total.merge(&b);
                }
                sx += s.xcen;
                sy += s.ycen;
                sxx += s.xcen * s.xcen;
                sxy += s.xcen * s.ycen;
            }
        } else {
            for (k, &j) in chain.segments.iter().enumerate() {
                let b = transformed_bbox(sgm.points_of(j as usize), &chain.affine);
                if k == 0 {
                    total = b;
                } else {
                    total.merge(&b);
                }
                let x = 0.5 * (b.xmax + b.xmin);
                let y = 0.5 * (b.ymax + b.ymin);
                sx += x;
                sy += y;
                sxx += x * x;
                sxy += x * y;
            }
        }

        let fit = fit_line(length as f64, sx, sy, sxx, sxy)?;

        // The tolerance is the precision in pixels divided by the lever arm,
        // which is the total width of the chain.
        let tol = prec / (1.0 + total.xmax - total.xmin);
        let converged = iter >= 1 && fit.alpha.abs() <= tol;
        chain.vertical_shear += fit.alpha;
        chain.affine[(1, 0)] = -chain.vertical_shear;
        if converged {
            chain.xmin = total.xmin;
            chain.xmax = total.xmax;
            chain.ymin = total.ymin;
            chain.ymax = total.ymax;
            return Ok(());
        }
        iter += 1;
        if iter > MAX_VERTICAL_ITER {
            return Err(Error::Singular);
        }
    }
}

/// Adjust the horizontal shear to maximise the spacing between consecutive
/// segments of the chain.
///
/// Grid search over shears in the order `0, +step, -step, +2*step, ...`
/// where a step moves the transformed boxes by a quarter pixel and the bound
/// corresponds to half the mean segment width; strict improvement keeps the
/// smallest shear magnitude on ties. The chain bounding box is then
/// recomputed under the chosen transform.
fn fit_horizontal_shear(chain: &mut Chain, sgm: &Segmentation) {
    let length = chain.segments.len();
    let mut a = chain.affine;

    let width = (1.0 + chain.xmax - chain.xmin) / length as f64;
    let height = 1.0 + chain.ymax - chain.ymin;
    let step = 0.25 / height;
    let bound = 0.5 * width / height;
    let maxiter = 2 * (bound / step).ceil() as usize;

    let mut best_shear = 0.0;
    let mut best_spacing = 0.0;
    for iter in 0..=maxiter {
        let shear = if iter % 2 == 0 {
            step * (iter / 2) as f64
        } else {
            -step * ((iter + 1) / 2) as f64
        };
        a[(0, 1)] = -shear;
        let mut spacing = 0.0;
        let mut prev_xmax = 0.0;
        for (k, &j) in chain.segments.iter().enumerate() {
            let b = transformed_bbox(sgm.points_of(j as usize), &a);
            if k != 0 {
                spacing += b.xmin - prev_xmax;
            }
            prev_xmax = b.xmax;
        }
        if iter == 0 || spacing > best_spacing {
            best_shear = shear;
            best_spacing = spacing;
        }
    }

    chain.horizontal_shear = best_shear;
    chain.affine[(0, 1)] = -best_shear;
    a[(0, 1)] = -best_shear;

    let mut total = Bbox::default();
    for (k, &j) in chain.segments.iter().enumerate() {
        let b = transformed_bbox(sgm.points_of(j as usize), &a);
        if k == 0 {
            total = b;
        } else {
            total.merge(&b);
        }
    }
    chain.xmin = total.xmin;
    chain.xmax = total.xmax;
    chain.ymin = total.ymin;
    chain.ymax = total.ymax;
}
