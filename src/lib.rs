//! Lazy k-way merge of sorted sources.
//!
//! Every source must already be sorted by the comparator. The merge pulls at most one element
//! ahead per source, so memory stays proportional to the number of sources no matter how long
//! (or infinite) they are. Values that compare equal come out in source order.
//!
//! Synchronous sources are plain iterators ([`merge`], [`merge_by`], [`merge_pairs_by`]);
//! asynchronous ones are `futures` streams ([`stream::merge_streams_by`]). Stopping early is
//! just dropping the merge, which releases every source without pulling from it again.

pub mod compare;
pub mod error;
mod frontier;
mod heap;
pub mod merge;
pub mod stream;
mod tag;

#[cfg(test)]
mod test_support;

pub use compare::{Compare, Natural, PairCompare};
pub use error::MergeError;
pub use merge::{
    merge, merge_by, merge_optional_by, merge_optional_pairs_by, merge_pairs_by, try_merge_by,
    try_merge_pairs_by, Merge, MergePairs,
};
