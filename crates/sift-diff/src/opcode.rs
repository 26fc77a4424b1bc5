//! Edit opcodes: typed, range-addressed operations derived from matching
//! blocks.
//!
//! The opcode list for a pair of sequences partitions `[0, len(a))` and
//! `[0, len(b))` completely, in order, with no gap or overlap.

use serde::{Deserialize, Serialize};

use crate::matcher::MatchingBlock;

/// The kind of edit an opcode describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    /// `a[a_start..a_end]` equals `b[b_start..b_end]`.
    Equal,
    /// `a[a_start..a_end]` should be replaced by `b[b_start..b_end]`.
    Replace,
    /// `b[b_start..b_end]` should be inserted at `a_start`.
    Insert,
    /// `a[a_start..a_end]` should be deleted.
    Delete,
}

/// A single edit operation over half-open ranges of both sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    /// What to do with the addressed ranges.
    pub tag: OpTag,
    /// Start of the range in sequence `a`.
    pub a_start: usize,
    /// End (exclusive) of the range in sequence `a`.
    pub a_end: usize,
    /// Start of the range in sequence `b`.
    pub b_start: usize,
    /// End (exclusive) of the range in sequence `b`.
    pub b_end: usize,
}

impl Opcode {
    /// The range this opcode addresses in sequence `a`.
    pub const fn a_range(&self) -> std::ops::Range<usize> {
        self.a_start..self.a_end
    }

    /// The range this opcode addresses in sequence `b`.
    pub const fn b_range(&self) -> std::ops::Range<usize> {
        self.b_start..self.b_end
    }
}

/// Convert a sentinel-terminated matching block list into the complete
/// opcode partition.
///
/// A gap before a block that advances both axes is a `Replace`; advancing
/// only `a` is a `Delete`, only `b` an `Insert`. The block itself emits an
/// `Equal` when it has nonzero length, so the zero-length sentinel
/// contributes only its preceding gap.
pub fn blocks_to_opcodes(blocks: &[MatchingBlock]) -> Vec<Opcode> {
    let mut opcodes = Vec::new();
    let mut i = 0;
    let mut j = 0;
    for block in blocks {
        let gap_tag = match (i < block.a_start, j < block.b_start) {
            (true, true) => Some(OpTag::Replace),
            (true, false) => Some(OpTag::Delete),
            (false, true) => Some(OpTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = gap_tag {
            opcodes.push(Opcode {
                tag,
                a_start: i,
                a_end: block.a_start,
                b_start: j,
                b_end: block.b_start,
            });
        }
        if block.len > 0 {
            opcodes.push(Opcode {
                tag: OpTag::Equal,
                a_start: block.a_start,
                a_end: block.a_end(),
                b_start: block.b_start,
                b_end: block.b_end(),
            });
        }
        i = block.a_end();
        j = block.b_end();
    }
    opcodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_on_both_axes_is_a_replace() {
        let blocks = [
            MatchingBlock::new(0, 0, 2),
            MatchingBlock::new(4, 5, 1),
            MatchingBlock::new(5, 6, 0),
        ];
        let ops = blocks_to_opcodes(&blocks);
        assert_eq!(
            ops,
            vec![
                Opcode {
                    tag: OpTag::Equal,
                    a_start: 0,
                    a_end: 2,
                    b_start: 0,
                    b_end: 2,
                },
                Opcode {
                    tag: OpTag::Replace,
                    a_start: 2,
                    a_end: 4,
                    b_start: 2,
                    b_end: 5,
                },
                Opcode {
                    tag: OpTag::Equal,
                    a_start: 4,
                    a_end: 5,
                    b_start: 5,
                    b_end: 6,
                },
            ]
        );
    }

    #[test]
    fn one_axis_gaps_are_deletes_and_inserts() {
        let blocks = [
            MatchingBlock::new(2, 0, 3),
            MatchingBlock::new(5, 7, 0),
        ];
        let ops = blocks_to_opcodes(&blocks);
        assert_eq!(ops[0].tag, OpTag::Delete);
        assert_eq!((ops[0].a_start, ops[0].a_end), (0, 2));
        assert_eq!((ops[0].b_start, ops[0].b_end), (0, 0));
        assert_eq!(ops[1].tag, OpTag::Equal);
        assert_eq!(ops[2].tag, OpTag::Insert);
        assert_eq!((ops[2].a_start, ops[2].a_end), (5, 5));
        assert_eq!((ops[2].b_start, ops[2].b_end), (3, 7));
    }

    #[test]
    fn lone_sentinel_produces_no_opcodes() {
        let blocks = [MatchingBlock::new(0, 0, 0)];
        assert!(blocks_to_opcodes(&blocks).is_empty());
    }

    #[test]
    fn tags_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&OpTag::Replace).unwrap(),
            "\"replace\""
        );
        assert_eq!(serde_json::to_string(&OpTag::Equal).unwrap(), "\"equal\"");
    }
}
