use std::fmt;

use tracing::{debug, trace};

use crate::{
    compare::Compare,
    heap,
    tag::{tag, ByValue, Tagged, TaggedSource},
};

/// Holds at most one pending element per source and hands them out smallest first.
///
/// The element just handed out is not replaced right away. Its source is only pulled again
/// on the following call to [`Frontier::next`], so a consumer that stops early never causes a
/// pull it didn't ask for.
pub(crate) struct Frontier<I: Iterator, C> {
    heap: Vec<Tagged<I::Item>>,
    handles: Vec<Option<TaggedSource<I>>>,
    cmp: ByValue<C>,
    refill: Option<usize>,
}

impl<I, C> Frontier<I, C>
where
    I: Iterator,
    C: Compare<I::Item>,
{
    pub(crate) fn new(sources: Vec<Option<I>>, cmp: C) -> Self {
        let mut cmp = ByValue(cmp);
        let mut pending = Vec::with_capacity(sources.len());
        let mut handles = Vec::with_capacity(sources.len());

        for (index, source) in sources.into_iter().enumerate() {
            let handle = source.and_then(|iter| {
                let mut handle = tag(index, iter);
                pending.push(handle.next()?);
                Some(handle)
            });
            handles.push(handle);
        }

        heap::heapify(&mut pending, &mut cmp.less_fn());

        debug!(
            sources = handles.len(),
            active = pending.len(),
            "frontier initialized"
        );

        Frontier {
            heap: pending,
            handles,
            cmp,
            refill: None,
        }
    }

    pub(crate) fn next(&mut self) -> Option<I::Item> {
        if let Some(index) = self.refill.take() {
            self.pull(index);
        }

        let min = heap::pop(&mut self.heap, &mut self.cmp.less_fn())?;
        self.refill = Some(min.index);

        Some(min.value)
    }

    fn pull(&mut self, index: usize) {
        let Some(handle) = self.handles[index].as_mut() else {
            return;
        };

        match handle.next() {
            Some(next) => heap::push(&mut self.heap, next, &mut self.cmp.less_fn()),
            None => {
                trace!(source = index, "source exhausted");
                self.handles[index] = None;
            }
        }
    }
}

impl<I: Iterator, C> Frontier<I, C> {
    /// Number of sources that currently have an element waiting in the heap.
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.heap.len();

        self.handles
            .iter()
            .flatten()
            .fold((pending, Some(pending)), |(lo, hi), handle| {
                let (l, u) = handle.size_hint();
                (
                    lo.saturating_add(l),
                    hi.and_then(|hi| u.and_then(|u| hi.checked_add(u))),
                )
            })
    }
}

impl<I: Iterator, C> fmt::Debug for Frontier<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frontier")
            .field("active", &self.heap.len())
            .field(
                "open_sources",
                &self.handles.iter().filter(|h| h.is_some()).count(),
            )
            .field("refill", &self.refill)
            .finish()
    }
}
