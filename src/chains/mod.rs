//! Chaining of segments into candidate text lines.
//!
//! Over the x-sorted segments of a [`Segmentation`], the builder inserts
//! level-1 chain links between admissible pairs (height compatibility,
//! bounded slope, bounded relative spacing, redundancy pruning), then
//! repeatedly extends the links of the current top level with aligned
//! successors. Each link at level `l` covers `l + 1` segments; a link with
//! no parents defines a maximal chain. Maximal chains of admissible length
//! get a vertical shear fitted by iterated linear regression of their
//! transformed bounding boxes and a horizontal shear chosen to maximise the
//! spacing between consecutive segments.
//!
//! The chain-link graph and its arena exist only inside
//! [`ChainPool::build`]; the resulting pool owns flat [`Chain`] records plus
//! one reference to the segmentation they index into.

mod arena;
mod fit;
mod graph;
mod options;

pub use options::ChainOptions;

use std::sync::Arc;

use log::debug;
use nalgebra::Matrix2;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::segmentation::Segmentation;

/// A maximal, length-filtered sequence of segments with fitted shears.
///
/// The bounding box is the union of the member segments' boxes under the
/// fitted transform (identity sheared by `-vertical_shear` vertically and
/// `-horizontal_shear` horizontally).
#[derive(Clone, Debug, Serialize)]
pub struct Chain {
    segments: Vec<u32>,
    vertical_shear: f64,
    horizontal_shear: f64,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    affine: Matrix2<f64>,
}

impl Chain {
    fn new(segments: Vec<u32>) -> Self {
        Self {
            segments,
            vertical_shear: 0.0,
            horizontal_shear: 0.0,
            xmin: 0.0,
            xmax: 0.0,
            ymin: 0.0,
            ymax: 0.0,
            affine: Matrix2::identity(),
        }
    }

    /// Number of segments in the chain.
    pub fn length(&self) -> usize {
        self.segments.len()
    }

    /// Indices of the chain's segments in the source segmentation,
    /// ordered left to right.
    pub fn segment_indices(&self) -> &[u32] {
        &self.segments
    }

    pub fn vertical_shear(&self) -> f64 {
        self.vertical_shear
    }

    pub fn horizontal_shear(&self) -> f64 {
        self.horizontal_shear
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// The 2x2 transform the bounding box was computed under.
    pub fn affine(&self) -> &Matrix2<f64> {
        &self.affine
    }
}

/// The surviving chains of one segmentation.
#[derive(Clone, Debug)]
pub struct ChainPool {
    segmentation: Arc<Segmentation>,
    chains: Vec<Chain>,
}

impl ChainPool {
    /// Build the pool of maximal chains over `sgm`.
    ///
    /// Takes one reference on the segmentation for the lifetime of the pool.
    /// Chains whose shear fit degenerates or fails to converge are silently
    /// dropped; a pool with zero chains is a successful outcome.
    pub fn build(sgm: &Arc<Segmentation>, options: &ChainOptions) -> Result<Self> {
        let t = options.tuning();
        let maximal = graph::maximal_chains(sgm, &t);

        let mut chains = Vec::with_capacity(maximal.len());
        let mut discarded = 0usize;
        for seq in maximal {
            let mut chain = Chain::new(seq);
            match fit::fit_chain(&mut chain, sgm, t.prec) {
                Ok(()) => chains.push(chain),
                Err(Error::Singular) => discarded += 1,
                Err(e) => return Err(e),
            }
        }
        debug!(
            "chain pool: {} chains kept, {} discarded by the shear fit",
            chains.len(),
            discarded
        );
        Ok(Self {
            segmentation: Arc::clone(sgm),
            chains,
        })
    }

    // --- Queries -----------------------------------------------------------

    /// Number of chains in the pool.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Width of the image the segmentation was built from.
    pub fn image_width(&self) -> usize {
        self.segmentation.image_width()
    }

    /// Height of the image the segmentation was built from.
    pub fn image_height(&self) -> usize {
        self.segmentation.image_height()
    }

    /// The segmentation the chains index into.
    pub fn segmentation(&self) -> &Arc<Segmentation> {
        &self.segmentation
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, j: usize) -> Result<&Chain> {
        self.chains
            .get(j)
            .ok_or(Error::InvalidArgument("chain index out of range"))
    }

    /// Segment indices (in source-segmentation space) of the `j`-th chain.
    pub fn segment_indices(&self, j: usize) -> Result<&[u32]> {
        Ok(self.chain(j)?.segment_indices())
    }
}

macro_rules! chain_attr_vec {
    ($(#[$doc:meta] $name:ident: $field:ident -> $ty:ty,)*) => {
        impl ChainPool {
            $(
                #[$doc]
                pub fn $name(&self) -> Vec<$ty> {
                    self.chains.iter().map(|c| c.$field).collect()
                }
            )*
        }
    };
}

chain_attr_vec! {
    /// Vertical shears of all chains.
    vertical_shears: vertical_shear -> f64,
    /// Horizontal shears of all chains.
    horizontal_shears: horizontal_shear -> f64,
    /// `xmin` of all chains.
    xmins: xmin -> f64,
    /// `xmax` of all chains.
    xmaxs: xmax -> f64,
    /// `ymin` of all chains.
    ymins: ymin -> f64,
    /// `ymax` of all chains.
    ymaxs: ymax -> f64,
}

impl ChainPool {
    /// Lengths (in segments) of all chains.
    pub fn lengths(&self) -> Vec<usize> {
        self.chains.iter().map(|c| c.segments.len()).collect()
    }
}
