//! Sequence matching engine for Sift.
//!
//! Computes how two ordered sequences of comparable elements relate: a list
//! of matching blocks, a gap-free partition of typed edit opcodes, and a
//! similarity ratio. The core is the O(NP) comparison algorithm of Wu,
//! Manber, Myers and Miller, wrapped in affix-stripping and
//! discard-indexing optimizations that bound its effective input size.
//!
//! # Key Types
//!
//! - [`SequenceMatcher`] — Compares two frozen sequences
//! - [`MatchingBlock`] — A maximal run of equal elements, sentinel-terminated lists
//! - [`Opcode`] / [`OpTag`] — Typed, range-addressed edit operations
//! - [`common_prefix_len`] / [`common_suffix_len`] — Shared affix lengths

pub mod affix;
pub mod matcher;
pub mod opcode;

pub use affix::{common_prefix_len, common_suffix_len};
pub use matcher::{MatchingBlock, SequenceMatcher};
pub use opcode::{blocks_to_opcodes, OpTag, Opcode};
