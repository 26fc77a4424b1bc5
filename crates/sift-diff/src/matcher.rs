//! Sequence matcher built on the O(NP) comparison algorithm.
//!
//! Implements the algorithm from Wu, Manber, Myers and Miller,
//! "An O(NP) Sequence Comparison Algorithm" (1989), with two pre-processing
//! optimizations (common affix stripping, discarding of elements absent from
//! the other sequence) and two post-processing passes (coordinate
//! restoration, backward merging of fragmented matches).

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::affix::{common_prefix_len, common_suffix_len};
use crate::opcode::{blocks_to_opcodes, OpTag, Opcode};

/// Minimum number of discarded elements (on either side) before the discard
/// optimization pays for its index bookkeeping.
const DISCARD_THRESHOLD: usize = 10;

/// A maximal run of elements equal at corresponding positions in both
/// sequences.
///
/// Block lists are sorted ascending on both axes, non-overlapping, and
/// terminated by a zero-length `(len(a), len(b), 0)` sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingBlock {
    /// Start of the run in sequence `a`.
    pub a_start: usize,
    /// Start of the run in sequence `b`.
    pub b_start: usize,
    /// Number of matching elements.
    pub len: usize,
}

impl MatchingBlock {
    /// Create a block covering `a[a_start..a_start + len]` and
    /// `b[b_start..b_start + len]`.
    pub const fn new(a_start: usize, b_start: usize, len: usize) -> Self {
        Self {
            a_start,
            b_start,
            len,
        }
    }

    /// One past the last matched position in sequence `a`.
    pub const fn a_end(&self) -> usize {
        self.a_start + self.len
    }

    /// One past the last matched position in sequence `b`.
    pub const fn b_end(&self) -> usize {
        self.b_start + self.len
    }
}

/// Compares two frozen sequences and reports how they relate.
///
/// The sequences are borrowed and never mutated; repeated queries on the
/// same matcher return identical results (the block list is computed once
/// and cached). Each matcher exclusively owns its working state, so
/// independent comparisons never share anything.
#[derive(Debug)]
pub struct SequenceMatcher<'s, T> {
    a: &'s [T],
    b: &'s [T],
    matching_blocks: Option<Vec<MatchingBlock>>,
}

impl<'s, T: Eq + Hash> SequenceMatcher<'s, T> {
    /// Create a matcher over sequences `a` and `b`.
    pub fn new(a: &'s [T], b: &'s [T]) -> Self {
        Self {
            a,
            b,
            matching_blocks: None,
        }
    }

    /// The matching blocks relating `a` to `b`, terminated by the
    /// `(len(a), len(b), 0)` sentinel.
    ///
    /// Computed on first call; later calls return the cached list.
    pub fn matching_blocks(&mut self) -> &[MatchingBlock] {
        if self.matching_blocks.is_none() {
            let blocks = self.compute_blocks();
            trace!(blocks = blocks.len(), "matching blocks computed");
            self.matching_blocks = Some(blocks);
        }
        self.matching_blocks.as_deref().unwrap_or(&[])
    }

    /// Typed edit operations that partition both sequences, in order, with
    /// no gap or overlap.
    pub fn opcodes(&mut self) -> Vec<Opcode> {
        blocks_to_opcodes(self.matching_blocks())
    }

    /// The opcodes that describe actual differences, i.e. everything except
    /// `Equal` runs.
    pub fn difference_opcodes(&mut self) -> Vec<Opcode> {
        self.opcodes()
            .into_iter()
            .filter(|op| op.tag != OpTag::Equal)
            .collect()
    }

    /// Similarity of the two sequences in `[0.0, 1.0]`: twice the number of
    /// matched elements over the total number of elements.
    ///
    /// Two empty sequences are considered identical (ratio 1.0).
    pub fn ratio(&mut self) -> f64 {
        let matched: usize = self.matching_blocks().iter().map(|b| b.len).sum();
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matched as f64 / total as f64
    }

    fn compute_blocks(&self) -> Vec<MatchingBlock> {
        self.compute_blocks_with_threshold(DISCARD_THRESHOLD)
    }

    fn compute_blocks_with_threshold(&self, threshold: usize) -> Vec<MatchingBlock> {
        // Pre-processing: strip the common prefix, then the common suffix of
        // what remains, then index away elements that cannot match anything.
        let prefix = common_prefix_len(self.a, self.b);
        let mut a_mid = &self.a[prefix..];
        let mut b_mid = &self.b[prefix..];
        let mut suffix = 0;
        if !a_mid.is_empty() && !b_mid.is_empty() {
            suffix = common_suffix_len(a_mid, b_mid);
            a_mid = &a_mid[..a_mid.len() - suffix];
            b_mid = &b_mid[..b_mid.len() - suffix];
        }
        let discard = DiscardIndex::build(a_mid, b_mid, threshold);
        self.assemble_blocks(a_mid, b_mid, prefix, suffix, discard.as_ref())
    }

    /// Run the core algorithm on the pre-processed middle and translate the
    /// resulting snake chain back into original coordinates.
    fn assemble_blocks(
        &self,
        a_mid: &[T],
        b_mid: &[T],
        prefix: usize,
        suffix: usize,
        discard: Option<&DiscardIndex<'_, T>>,
    ) -> Vec<MatchingBlock> {
        let (arena, last) = match discard {
            Some(d) => snake_chain(&d.a_kept, &d.b_kept),
            None => snake_chain(a_mid, b_mid),
        };

        let mut blocks = Vec::new();
        let mut cursor = last;
        while let Some(idx) = cursor {
            let node = &arena[idx];
            match discard {
                // A chain-contiguous snake may cover kept elements that were
                // not adjacent originally; split it at every index gap.
                Some(d) => d.split_snake(node, prefix, &mut blocks),
                None => blocks.push(MatchingBlock::new(
                    node.x + prefix,
                    node.y + prefix,
                    node.len,
                )),
            }
            cursor = node.prev;
        }
        // The chain was walked back to front; the prefix block lands last
        // here and first after the reversal.
        if prefix > 0 {
            blocks.push(MatchingBlock::new(0, 0, prefix));
        }
        blocks.reverse();
        if suffix > 0 {
            blocks.push(MatchingBlock::new(
                self.a.len() - suffix,
                self.b.len() - suffix,
                suffix,
            ));
        }
        blocks.push(MatchingBlock::new(self.a.len(), self.b.len(), 0));

        self.merge_chaff(blocks)
    }

    /// Backward merge of fragmented matches.
    ///
    /// The greedy core can leave small blocks that together form one larger
    /// match. Scanning backward, a block whose predecessor ends flush
    /// against it on at least one axis is extended over the predecessor
    /// whenever the literal slices across the gap re-verify as equal.
    fn merge_chaff(&self, blocks: Vec<MatchingBlock>) -> Vec<MatchingBlock> {
        let mut merged = Vec::with_capacity(blocks.len());
        merged.push(blocks[blocks.len() - 1]);
        let mut i = blocks.len() as isize - 2;
        while i >= 0 {
            let mut cur = blocks[i as usize];
            i -= 1;
            while i >= 0 {
                let prev = blocks[i as usize];
                if prev.b_end() == cur.b_start || prev.a_end() == cur.a_start {
                    let a_gap = &self.a[cur.a_start - prev.len..cur.a_start];
                    let b_gap = &self.b[cur.b_start - prev.len..cur.b_start];
                    if a_gap == b_gap {
                        cur.a_start -= prev.len;
                        cur.b_start -= prev.len;
                        cur.len += prev.len;
                        i -= 1;
                        continue;
                    }
                }
                break;
            }
            merged.push(cur);
        }
        merged.reverse();
        merged
    }
}

/// Index of the elements kept by the discard optimization.
///
/// Maps positions in the compacted sequences back to positions in the
/// trimmed middle. Built per comparison and dropped once the block list has
/// been reconstructed.
struct DiscardIndex<'m, T> {
    a_kept: Vec<&'m T>,
    b_kept: Vec<&'m T>,
    a_index: Vec<usize>,
    b_index: Vec<usize>,
}

impl<'m, T: Eq + Hash> DiscardIndex<'m, T> {
    /// Build the index, or `None` when fewer than `threshold` elements
    /// would be dropped on both sides and the bookkeeping is not worth it.
    fn build(a: &'m [T], b: &'m [T], threshold: usize) -> Option<Self> {
        if a.is_empty() || b.is_empty() {
            return None;
        }
        let (b_kept, b_index) = keep_matching(a, b);
        let (a_kept, a_index) = keep_matching(b, a);
        let a_dropped = a.len() - a_kept.len();
        let b_dropped = b.len() - b_kept.len();
        if a_dropped <= threshold && b_dropped <= threshold {
            return None;
        }
        debug!(
            a_dropped,
            b_dropped, "discarding elements absent from the other sequence"
        );
        Some(Self {
            a_kept,
            b_kept,
            a_index,
            b_index,
        })
    }

    /// Translate one snake from compacted coordinates back to the original
    /// sequences, splitting it wherever the kept elements were not adjacent
    /// (index step != 1 on either axis).
    ///
    /// Runs are emitted end-first; the caller reverses the whole list once.
    fn split_snake(&self, node: &SnakeNode, prefix: usize, blocks: &mut Vec<MatchingBlock>) {
        let mut x = node.x + node.len - 1;
        let mut y = node.y + node.len - 1;
        let mut a_prev = self.a_index[x] + prefix;
        let mut b_prev = self.b_index[y] + prefix;
        let mut run = 1;
        for _ in 1..node.len {
            x -= 1;
            y -= 1;
            let a_next = self.a_index[x] + prefix;
            let b_next = self.b_index[y] + prefix;
            if a_prev - a_next != 1 || b_prev - b_next != 1 {
                blocks.push(MatchingBlock::new(a_prev, b_prev, run));
                run = 0;
            }
            a_prev = a_next;
            b_prev = b_next;
            run += 1;
        }
        blocks.push(MatchingBlock::new(a_prev, b_prev, run));
    }
}

/// The subsequence of `b` whose elements occur somewhere in `a`, plus the
/// original position of each kept element.
fn keep_matching<'m, T: Eq + Hash>(a: &[T], b: &'m [T]) -> (Vec<&'m T>, Vec<usize>) {
    let present: HashSet<&T> = a.iter().collect();
    let mut kept = Vec::new();
    let mut index = Vec::new();
    for (i, elem) in b.iter().enumerate() {
        if present.contains(elem) {
            kept.push(elem);
            index.push(i);
        }
    }
    (kept, index)
}

/// One discovered snake: a maximal diagonal run of equal elements, linked to
/// the snake discovered before it on the same path.
///
/// Nodes live in an arena and point backward by index, so walking a chain is
/// a loop rather than a recursion over nested nodes.
struct SnakeNode {
    prev: Option<usize>,
    x: usize,
    y: usize,
    len: usize,
}

/// Core O(NP) loop: returns the snake arena and the chain head that reaches
/// the sink, or `None` when the sequences share nothing (or one is empty).
fn snake_chain<E: PartialEq>(a: &[E], b: &[E]) -> (Vec<SnakeNode>, Option<usize>) {
    let m = a.len();
    let n = b.len();
    if m == 0 || n == 0 {
        return (Vec::new(), None);
    }

    // Diagonal k of the edit graph is stored at index k + middle; the
    // diagonal through the sink lies at index delta.
    let middle = m + 1;
    let delta = n + 1;
    let dmin = middle.min(delta);
    let dmax = middle.max(delta);

    let mut arena: Vec<SnakeNode> = Vec::new();
    // Frontier: per diagonal, the furthest y reached and the snake chain
    // that reached it. y starts below the edit graph.
    let mut fp: Vec<(isize, Option<usize>)> = vec![(-1, None); n + m + 2];
    let mut p = 0usize;
    loop {
        // Sweep the diagonals below delta upward.
        let mut yv: isize = -1;
        let mut vnode: Option<usize> = None;
        for k in (dmin - p)..delta {
            let reached = fp[k + 1];
            if yv < reached.0 {
                yv = reached.0;
                vnode = reached.1;
            } else {
                yv += 1;
            }
            (yv, vnode) = slide(a, b, k, middle, yv, vnode, &mut arena);
            fp[k] = (yv, vnode);
        }
        // Sweep the diagonals above delta downward.
        let mut yh: isize = -1;
        let mut hnode: Option<usize> = None;
        for k in ((delta + 1)..=(dmax + p)).rev() {
            let reached = fp[k - 1];
            if yh <= reached.0 {
                yh = reached.0 + 1;
                hnode = reached.1;
            }
            (yh, hnode) = slide(a, b, k, middle, yh, hnode, &mut arena);
            fp[k] = (yh, hnode);
        }
        // Resolve the delta diagonal from whichever sweep got further; a
        // tie goes to the vertical sweep.
        let (mut y, mut node) = if yv < yh {
            fp[delta + 1]
        } else {
            let below = fp[delta - 1];
            (below.0 + 1, below.1)
        };
        (y, node) = slide(a, b, delta, middle, y, node, &mut arena);
        fp[delta] = (y, node);
        if y >= n as isize {
            trace!(p, snakes = arena.len(), "frontier reached the sink");
            return (arena, node);
        }
        p += 1;
    }
}

/// Extend greedily through the run of equal elements starting at the point
/// `(x, y)` implied by diagonal `k`, recording the run as a snake node.
///
/// Returns the advanced y and the (possibly new) chain head.
fn slide<E: PartialEq>(
    a: &[E],
    b: &[E],
    k: usize,
    middle: usize,
    mut y: isize,
    mut node: Option<usize>,
    arena: &mut Vec<SnakeNode>,
) -> (isize, Option<usize>) {
    let m = a.len() as isize;
    let n = b.len() as isize;
    let mut x = y - k as isize + middle as isize;
    if x >= 0 && x < m && y >= 0 && y < n && a[x as usize] == b[y as usize] {
        let start_x = x as usize;
        let start_y = y as usize;
        x += 1;
        y += 1;
        while x < m && y < n && a[x as usize] == b[y as usize] {
            x += 1;
            y += 1;
        }
        arena.push(SnakeNode {
            prev: node,
            x: start_x,
            y: start_y,
            len: x as usize - start_x,
        });
        node = Some(arena.len() - 1);
    }
    (y, node)
}
