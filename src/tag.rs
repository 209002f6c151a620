use std::cmp::Ordering;

use futures::{Stream, StreamExt};

use crate::compare::Compare;

/// A value together with the position of the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tagged<T> {
    pub(crate) index: usize,
    pub(crate) value: T,
}

impl<T> Tagged<T> {
    pub(crate) fn new(index: usize, value: T) -> Self {
        Tagged { index, value }
    }
}

/// Wraps every value of a source with that source's index.
#[derive(Debug)]
pub(crate) struct TaggedSource<I> {
    index: usize,
    iter: I,
}

pub(crate) fn tag<I: Iterator>(index: usize, iter: I) -> TaggedSource<I> {
    TaggedSource { index, iter }
}

impl<I: Iterator> Iterator for TaggedSource<I> {
    type Item = Tagged<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|value| Tagged::new(self.index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

pub(crate) fn tag_stream<S: Stream>(index: usize, stream: S) -> impl Stream<Item = Tagged<S::Item>> {
    stream.map(move |value| Tagged::new(index, value))
}

/// Compares tagged values by value only. The index never takes part in the ordering here.
#[derive(Debug)]
pub(crate) struct ByValue<C>(pub(crate) C);

impl<C> ByValue<C> {
    pub(crate) fn compare<T>(&mut self, a: &Tagged<T>, b: &Tagged<T>) -> Ordering
    where
        C: Compare<T>,
    {
        self.0.compare(&a.value, &b.value)
    }

    /// Heap order: by value, then by ascending source index.
    pub(crate) fn less<T>(&mut self, a: &Tagged<T>, b: &Tagged<T>) -> bool
    where
        C: Compare<T>,
    {
        self.compare(a, b).then(a.index.cmp(&b.index)) == Ordering::Less
    }

    pub(crate) fn less_fn<T>(&mut self) -> impl FnMut(&Tagged<T>, &Tagged<T>) -> bool + '_
    where
        C: Compare<T>,
    {
        move |a, b| self.less(a, b)
    }
}
