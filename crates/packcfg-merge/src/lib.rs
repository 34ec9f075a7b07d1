//! Structural deep merge for configuration trees.
//!
//! A base tree and an overlay tree are merged key by key:
//! - Objects: deep-merge by key (recursive)
//! - Arrays: concatenated or replaced, depending on [`ArrayPolicy`]
//! - Scalars and mismatched kinds: overlay wins
//!
//! Merging never mutates its inputs. Kind mismatches involving an array or an
//! object are reported as [`MergeTypeMismatch`] diagnostics alongside the result.

mod kind;
mod merge;

pub use kind::ValueKind;
pub use merge::{deep_merge, merge, merge_layers, merge_maps, ArrayPolicy, MergeTypeMismatch, Merged};
