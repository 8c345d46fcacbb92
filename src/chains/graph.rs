use log::debug;

use super::arena::Arena;
use super::fit::ShortLine;
use super::options::Tuning;
use crate::segmentation::Segmentation;

/// Child reference of a chain link: a leaf segment or a lower link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Node {
    Seg(u32),
    Link(u32),
}

/// One node of the chain-construction DAG.
///
/// A link at level `l` covers `l + 1` segments: its children are two
/// chainables of level `l - 1` that share their middle part. `first` and
/// `last` cache the endpoint segments; `next_link` threads the list of all
/// links sharing this link's left child.
#[derive(Clone, Copy, Debug)]
struct ChainLink {
    level: u32,
    nparents: u32,
    first_link: Option<u32>,
    next_link: Option<u32>,
    left: Node,
    right: Node,
    first: u32,
    last: u32,
}

/// Enumerate the maximal chains of a segmentation, longest level first.
///
/// Each returned vector holds segment indices (in source-segmentation
/// space) ordered left to right. The chain-link graph lives in an arena
/// local to this call and is dropped before returning.
pub(super) fn maximal_chains(sgm: &Segmentation, t: &Tuning) -> Vec<Vec<u32>> {
    GraphBuilder::new(sgm, *t).run()
}

struct GraphBuilder<'a> {
    sgm: &'a Segmentation,
    t: Tuning,
    links: Arena<ChainLink>,
    /// Head of the list of links whose left child is the given segment.
    seg_first_link: Vec<Option<u32>>,
}

impl<'a> GraphBuilder<'a> {
    fn new(sgm: &'a Segmentation, t: Tuning) -> Self {
        Self {
            sgm,
            t,
            links: Arena::new(),
            seg_first_link: vec![None; sgm.len()],
        }
    }

    fn run(mut self) -> Vec<Vec<u32>> {
        let segs = self.sgm.segments();
        let mut order: Vec<u32> = (0..segs.len() as u32).collect();
        order.sort_unstable_by(|&a, &b| segs[a as usize].xcen.total_cmp(&segs[b as usize].xcen));

        let mut count = self.level_one_pass(&order);
        debug!(
            "chain graph: {count} level-1 links over {} segments",
            segs.len()
        );
        while count > 0 {
            count = self.extend_top_level();
        }
        self.emit()
    }

    /// Create the level-1 links between admissible pairs of segments.
    fn level_one_pass(&mut self, order: &[u32]) -> usize {
        let segs = self.sgm.segments();
        let t = self.t;
        let mut count = 0;
        for (jl, &li) in order.iter().enumerate() {
            let left = &segs[li as usize];
            let h0 = left.height as f64;
            let w0 = left.width as f64;
            let x0 = left.xcen;
            let y0 = left.ycen;
            let hmin = (t.sq * h0 - t.sa) / t.sr;
            let hmax = (t.sr * h0 + t.sa) / t.sq;
            let xlim = x0 + t.rmax * (h0 + hmax);

            for &ri in &order[jl + 1..] {
                let right = &segs[ri as usize];

                // Segments are sorted by ascending xcen, so nothing
                // admissible remains beyond the x bound.
                let x1 = right.xcen;
                if x1 >= xlim {
                    break;
                }

                // Height must fall in the (exclusive) admissible range.
                let h1 = right.height as f64;
                if h1 <= hmin || h1 >= hmax {
                    continue;
                }

                let y1 = right.ycen;
                if (y1 - y0).abs() > t.slope * (x1 - x0).abs() {
                    continue;
                }

                let w1 = right.width as f64;
                let delta_x = x1 - x0;
                if delta_x < 1.0 + t.rmin * (w0 + w1) || delta_x > t.rmax * (h0 + h1) {
                    continue;
                }

                // Prefer the closer right neighbour: skip the pair when the
                // last segment of an existing link from `left` already lies
                // on the line through {left, right}. Closer candidates were
                // tried first, so a jump is only kept when no aligned
                // successor exists.
                if self.seg_first_link[li as usize].is_some() {
                    let pair = [li, ri];
                    let line = ShortLine::new(self.sgm, &pair);
                    let mut skip = false;
                    let mut next = self.seg_first_link[li as usize];
                    while let Some(id) = next {
                        let link = &self.links[id];
                        if line.accepts(&segs[link.last as usize], &t) {
                            skip = true;
                            break;
                        }
                        next = link.next_link;
                    }
                    if skip {
                        continue;
                    }
                }

                self.insert_link(Node::Seg(li), Node::Seg(ri));
                count += 1;
            }
        }
        count
    }

    /// One sweep over the links of the current top level, appending
    /// compatible extensions as links one level higher. Returns the number
    /// of links created.
    fn extend_top_level(&mut self) -> usize {
        let sweep_end = self.links.len() as u32;
        debug_assert!(sweep_end > 0);
        let level = self.links[sweep_end - 1].level;
        let length = (level + 1) as usize;
        debug_assert!(length <= self.sgm.len());
        if length >= self.t.lmax {
            // Extending would exceed the maximum chain length.
            return 0;
        }

        let sgm = self.sgm;
        let t = self.t;
        let mut count = 0;
        let mut chain_buf: Vec<u32> = Vec::with_capacity(length);
        for id in (0..sweep_end).rev() {
            if self.links[id].level != level {
                break;
            }
            let Some(head) = self.first_link_of(self.links[id].right) else {
                continue;
            };

            chain_buf.clear();
            self.collect_segments(id, &mut chain_buf);
            debug_assert_eq!(chain_buf.len(), length);

            // Accept successors that stay aligned with the whole chain
            // defined by this link.
            let line = ShortLine::new(sgm, &chain_buf);
            let mut next = Some(head);
            while let Some(ext) = next {
                next = self.links[ext].next_link;
                let last = self.links[ext].last;
                if line.accepts(&sgm.segments()[last as usize], &t) {
                    self.insert_link(Node::Link(id), Node::Link(ext));
                    count += 1;
                }
            }
        }
        debug!("chain graph: {count} links at level {}", level + 1);
        count
    }

    /// Collect the maximal chains, newest (longest) first.
    fn emit(self) -> Vec<Vec<u32>> {
        let mut chains = Vec::new();
        for id in (0..self.links.len() as u32).rev() {
            let link = &self.links[id];
            let length = (link.level + 1) as usize;
            if length < self.t.lmin {
                // Links are threaded newest first, so levels only decrease
                // from here on.
                break;
            }
            if link.nparents != 0 {
                continue;
            }
            let mut seq = Vec::with_capacity(length);
            self.collect_segments(id, &mut seq);
            debug_assert_eq!(seq.len(), length);
            chains.push(seq);
        }
        chains
    }

    /// Left-to-right segment sequence covered by `top`: walk down the left
    /// rib, taking each link's first segment, then finish in the right leaf.
    fn collect_segments(&self, top: u32, out: &mut Vec<u32>) {
        let mut node = Node::Link(top);
        loop {
            match node {
                Node::Link(l) => {
                    out.push(self.links[l].first);
                    node = self.links[l].right;
                }
                Node::Seg(s) => {
                    out.push(s);
                    break;
                }
            }
        }
    }

    fn insert_link(&mut self, left: Node, right: Node) {
        debug_assert_eq!(self.level_of(left), self.level_of(right));
        #[cfg(debug_assertions)]
        if let (Node::Link(l), Node::Link(r)) = (left, right) {
            debug_assert_eq!(
                self.links[l].right,
                self.links[r].left,
                "extension must share its middle chain"
            );
        }

        let level = self.level_of(left) + 1;
        let first = self.first_of(left);
        let last = self.last_of(right);
        let next_link = self.first_link_of(left);
        let id = self.links.alloc(ChainLink {
            level,
            nparents: 0,
            first_link: None,
            next_link,
            left,
            right,
            first,
            last,
        });
        self.set_first_link(left, id);
        self.bump_parents(left);
        self.bump_parents(right);
    }

    fn level_of(&self, n: Node) -> u32 {
        match n {
            Node::Seg(_) => 0,
            Node::Link(l) => self.links[l].level,
        }
    }

    fn first_of(&self, n: Node) -> u32 {
        match n {
            Node::Seg(s) => s,
            Node::Link(l) => self.links[l].first,
        }
    }

    fn last_of(&self, n: Node) -> u32 {
        match n {
            Node::Seg(s) => s,
            Node::Link(l) => self.links[l].last,
        }
    }

    fn first_link_of(&self, n: Node) -> Option<u32> {
        match n {
            Node::Seg(s) => self.seg_first_link[s as usize],
            Node::Link(l) => self.links[l].first_link,
        }
    }

    fn set_first_link(&mut self, n: Node, id: u32) {
        match n {
            Node::Seg(s) => self.seg_first_link[s as usize] = Some(id),
            Node::Link(l) => self.links[l].first_link = Some(id),
        }
    }

    /// Segment parent counts are never consulted, so only links track them.
    fn bump_parents(&mut self, n: Node) {
        if let Node::Link(l) = n {
            self.links[l].nparents += 1;
        }
    }
}
