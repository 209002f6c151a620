use std::{cmp::Ordering, fmt, iter::FusedIterator, mem};

use crate::{
    compare::{Compare, Natural, PairCompare},
    error::MergeError,
    frontier::Frontier,
};

/// Iterator over the k-way merge of several sorted sources.
///
/// Created by [`merge`], [`merge_by`], [`merge_pairs_by`] and friends. Nothing is pulled from
/// any source until the first call to `next`.
pub struct Merge<I: Iterator, C> {
    state: State<I, C>,
}

/// A merge of `(K, V)` sources ordered by a four argument comparator.
pub type MergePairs<I, F> = Merge<I, PairCompare<F>>;

enum State<I: Iterator, C> {
    Idle { sources: Vec<Option<I>>, cmp: C },
    Running(Frontier<I, C>),
    Done,
}

impl<I, C> Merge<I, C>
where
    I: Iterator,
    C: Compare<I::Item>,
{
    /// Merges `sources`, any of which may be absent. If all of them are absent the merge is
    /// finished from the start and no merge state is ever built.
    pub fn new<S>(cmp: C, sources: S) -> Self
    where
        S: IntoIterator<Item = Option<I>>,
    {
        let sources: Vec<_> = sources.into_iter().collect();

        let state = if sources.iter().all(Option::is_none) {
            State::Done
        } else {
            State::Idle { sources, cmp }
        };

        Merge { state }
    }

    /// Like [`Merge::new`], but rejects a missing comparator before touching any source.
    pub fn try_new<S>(cmp: Option<C>, sources: S) -> Result<Self, MergeError>
    where
        S: IntoIterator<Item = Option<I>>,
    {
        let cmp = cmp.ok_or(MergeError::MissingComparator)?;
        Ok(Merge::new(cmp, sources))
    }
}

impl<I, C> Iterator for Merge<I, C>
where
    I: Iterator,
    C: Compare<I::Item>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                State::Running(frontier) => {
                    let next = frontier.next();
                    if next.is_none() {
                        self.state = State::Done;
                    }
                    return next;
                }
                State::Done => return None,
                State::Idle { .. } => {
                    if let State::Idle { sources, cmp } = mem::replace(&mut self.state, State::Done)
                    {
                        self.state = State::Running(Frontier::new(sources, cmp));
                    }
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.state {
            State::Idle { sources, .. } => {
                sources
                    .iter()
                    .flatten()
                    .fold((0, Some(0)), |(lo, hi): (usize, Option<usize>), source| {
                        let (l, u) = source.size_hint();
                        (
                            lo.saturating_add(l),
                            hi.and_then(|hi| u.and_then(|u| hi.checked_add(u))),
                        )
                    })
            }
            State::Running(frontier) => frontier.size_hint(),
            State::Done => (0, Some(0)),
        }
    }
}

impl<I, C> FusedIterator for Merge<I, C>
where
    I: Iterator,
    C: Compare<I::Item>,
{
}

impl<I: Iterator, C> fmt::Debug for Merge<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Merge");
        match &self.state {
            State::Idle { sources, .. } => {
                s.field("state", &"idle").field("sources", &sources.len())
            }
            State::Running(frontier) => {
                s.field("state", &"running").field("active", &frontier.len())
            }
            State::Done => s.field("state", &"done"),
        };
        s.finish()
    }
}

/// Merges sorted sources in their natural order.
///
/// ```
/// let merged: Vec<_> = kway_merge::merge([vec![1, 3, 5], vec![2, 4, 6]]).collect();
/// assert_eq!(vec![1, 2, 3, 4, 5, 6], merged);
/// ```
pub fn merge<S, I>(sources: S) -> Merge<I::IntoIter, Natural>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator,
    I::Item: Ord,
{
    Merge::new(Natural, sources.into_iter().map(|s| Some(s.into_iter())))
}

/// Merges sources that are each sorted according to `cmp`.
///
/// Values that compare equal come out in the order of the sources they were taken from. Every
/// source must already be sorted by `cmp`; this is not checked, and unsorted input produces an
/// unspecified order.
pub fn merge_by<S, I, F>(cmp: F, sources: S) -> Merge<I::IntoIter, F>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    Merge::new(cmp, sources.into_iter().map(|s| Some(s.into_iter())))
}

/// Same as [`merge_by`], with `None` standing in for an absent source.
pub fn merge_optional_by<S, I, F>(cmp: F, sources: S) -> Merge<I::IntoIter, F>
where
    S: IntoIterator<Item = Option<I>>,
    I: IntoIterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    Merge::new(cmp, sources.into_iter().map(|s| s.map(IntoIterator::into_iter)))
}

/// [`merge_by`] with a comparator that may be missing.
pub fn try_merge_by<S, I, F>(
    cmp: Option<F>,
    sources: S,
) -> Result<Merge<I::IntoIter, F>, MergeError>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator,
    F: FnMut(&I::Item, &I::Item) -> Ordering,
{
    Merge::try_new(cmp, sources.into_iter().map(|s| Some(s.into_iter())))
}

/// Merges sources of key/value pairs.
///
/// `cmp` receives `(key1, value1, key2, value2)`. Ties are broken by source order just like
/// [`merge_by`].
pub fn merge_pairs_by<S, I, K, V, F>(cmp: F, sources: S) -> MergePairs<I::IntoIter, F>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(&K, &V, &K, &V) -> Ordering,
{
    Merge::new(
        PairCompare(cmp),
        sources.into_iter().map(|s| Some(s.into_iter())),
    )
}

/// Same as [`merge_pairs_by`], with `None` standing in for an absent source.
pub fn merge_optional_pairs_by<S, I, K, V, F>(cmp: F, sources: S) -> MergePairs<I::IntoIter, F>
where
    S: IntoIterator<Item = Option<I>>,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(&K, &V, &K, &V) -> Ordering,
{
    Merge::new(
        PairCompare(cmp),
        sources.into_iter().map(|s| s.map(IntoIterator::into_iter)),
    )
}

/// [`merge_pairs_by`] with a comparator that may be missing.
pub fn try_merge_pairs_by<S, I, K, V, F>(
    cmp: Option<F>,
    sources: S,
) -> Result<MergePairs<I::IntoIter, F>, MergeError>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(&K, &V, &K, &V) -> Ordering,
{
    Merge::try_new(
        cmp.map(PairCompare),
        sources.into_iter().map(|s| Some(s.into_iter())),
    )
}
