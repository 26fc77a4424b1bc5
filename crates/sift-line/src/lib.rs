//! Line comparison layer for Sift.
//!
//! Compares two single-line strings and reports which character ranges
//! changed, for a renderer to paint over the original text. The common
//! leading and trailing runs are trimmed with a direct paired scan, the
//! sequence matcher runs over the remaining middle, and the resulting
//! opcodes are remapped to absolute character offsets tagged with the kind
//! of change.
//!
//! Offsets are character indices into the original strings, not byte
//! offsets, so multibyte text maps directly onto character-addressed
//! display surfaces.
//!
//! # Key Types
//!
//! - [`LineDiff`] — The tagged ranges for both sides of a comparison
//! - [`TaggedRange`] — One changed character range
//! - [`ChangeKind`] — Update / Insert / Delete

use serde::{Deserialize, Serialize};

use sift_diff::{OpTag, SequenceMatcher};

/// The kind of change a tagged range represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The range was rewritten (differs on both sides).
    Update,
    /// The range exists only on the new side.
    Insert,
    /// The range exists only on the old side.
    Delete,
}

/// A changed character range `[start, end)` in one side's original string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedRange {
    /// First changed character.
    pub start: usize,
    /// One past the last changed character.
    pub end: usize,
    /// What happened to the range.
    pub kind: ChangeKind,
}

impl TaggedRange {
    /// Create a tagged range over `[start, end)`.
    pub const fn new(start: usize, end: usize, kind: ChangeKind) -> Self {
        Self { start, end, kind }
    }
}

/// The result of comparing two lines: one ordered, non-overlapping range
/// list per side. Unchanged regions are not reported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// Changed ranges in the old line (`Update` and `Delete`).
    pub old: Vec<TaggedRange>,
    /// Changed ranges in the new line (`Update` and `Insert`).
    pub new: Vec<TaggedRange>,
}

impl LineDiff {
    /// Create an empty line diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the lines were identical.
    pub fn is_empty(&self) -> bool {
        self.old.is_empty() && self.new.is_empty()
    }
}

/// Compare two single-line strings and report their changed character
/// ranges.
///
/// `Replace` opcodes tag both sides [`ChangeKind::Update`]; insertions tag
/// only the new side, deletions only the old side; equal runs are dropped.
pub fn diff_lines(old: &str, new: &str) -> LineDiff {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let leading = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let trailing = a[leading..]
        .iter()
        .rev()
        .zip(b[leading..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[leading..a.len() - trailing];
    let b_mid = &b[leading..b.len() - trailing];

    let mut diff = LineDiff::new();
    let mut matcher = SequenceMatcher::new(a_mid, b_mid);
    for op in matcher.opcodes() {
        match op.tag {
            OpTag::Replace => {
                diff.old.push(TaggedRange::new(
                    op.a_start + leading,
                    op.a_end + leading,
                    ChangeKind::Update,
                ));
                diff.new.push(TaggedRange::new(
                    op.b_start + leading,
                    op.b_end + leading,
                    ChangeKind::Update,
                ));
            }
            OpTag::Insert => {
                diff.new.push(TaggedRange::new(
                    op.b_start + leading,
                    op.b_end + leading,
                    ChangeKind::Insert,
                ));
            }
            OpTag::Delete => {
                diff.old.push(TaggedRange::new(
                    op.a_start + leading,
                    op.a_end + leading,
                    ChangeKind::Delete,
                ));
            }
            OpTag::Equal => {}
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_replacement_tags_only_the_word() {
        let diff = diff_lines("The quick brown fox", "The quick red fox");
        // "The quick " and " fox" are untouched; within "brown" the 'r'
        // matches 'r' of "red".
        assert_eq!(
            diff.old,
            vec![
                TaggedRange::new(10, 11, ChangeKind::Delete),
                TaggedRange::new(12, 15, ChangeKind::Update),
            ]
        );
        assert_eq!(diff.new, vec![TaggedRange::new(11, 13, ChangeKind::Update)]);
    }

    #[test]
    fn ranges_stay_inside_the_changed_region() {
        let diff = diff_lines("The quick brown fox", "The quick red fox");
        for range in &diff.old {
            assert!(range.start >= 10 && range.end <= 15);
        }
        for range in &diff.new {
            assert!(range.start >= 10 && range.end <= 13);
        }
    }

    #[test]
    fn identical_lines_report_nothing() {
        let diff = diff_lines("unchanged line", "unchanged line");
        assert!(diff.is_empty());
    }

    #[test]
    fn both_empty_report_nothing() {
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn insertion_into_empty_line_spans_everything() {
        let diff = diff_lines("", "anything");
        assert!(diff.old.is_empty());
        assert_eq!(diff.new, vec![TaggedRange::new(0, 8, ChangeKind::Insert)]);
    }

    #[test]
    fn deletion_to_empty_line_spans_everything() {
        let diff = diff_lines("anything", "");
        assert_eq!(diff.old, vec![TaggedRange::new(0, 8, ChangeKind::Delete)]);
        assert!(diff.new.is_empty());
    }

    #[test]
    fn pure_insertion_between_words() {
        let diff = diff_lines("alpha gamma", "alpha beta gamma");
        assert!(diff.old.is_empty());
        assert_eq!(diff.new, vec![TaggedRange::new(6, 11, ChangeKind::Insert)]);
    }

    #[test]
    fn no_common_suffix_still_compares_the_tail() {
        let diff = diff_lines("value = 10", "value = 25");
        assert_eq!(diff.old, vec![TaggedRange::new(8, 10, ChangeKind::Update)]);
        assert_eq!(diff.new, vec![TaggedRange::new(8, 10, ChangeKind::Update)]);
    }

    #[test]
    fn completely_different_lines_are_one_update() {
        let diff = diff_lines("qqqq", "zzz");
        assert_eq!(diff.old, vec![TaggedRange::new(0, 4, ChangeKind::Update)]);
        assert_eq!(diff.new, vec![TaggedRange::new(0, 3, ChangeKind::Update)]);
    }

    #[test]
    fn offsets_are_character_based() {
        // 'é' is two bytes but one character; the range must count chars.
        let diff = diff_lines("café au lait", "cafe au lait");
        assert_eq!(diff.old, vec![TaggedRange::new(3, 4, ChangeKind::Update)]);
        assert_eq!(diff.new, vec![TaggedRange::new(3, 4, ChangeKind::Update)]);
    }

    #[test]
    fn ranges_are_ordered_and_disjoint_per_side() {
        let diff = diff_lines(
            "let total = count + offset;",
            "let sum = count - offset_base;",
        );
        for side in [&diff.old, &diff.new] {
            for pair in side.windows(2) {
                assert!(pair[0].end <= pair[1].start);
            }
        }
    }

    #[test]
    fn serializes_for_renderer_handoff() {
        let diff = diff_lines("ab", "ac");
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "old": [{"start": 1, "end": 2, "kind": "update"}],
                "new": [{"start": 1, "end": 2, "kind": "update"}],
            })
        );
    }
}
