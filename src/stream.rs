//! K-way merge over asynchronous sources.
//!
//! Sources are awaited one at a time, never polled concurrently. The merged stream holds at
//! most one element per source, and the source of the element just yielded is only polled
//! again once the consumer asks for more.

use std::{cmp::Ordering, pin::Pin};

use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{debug, trace};

use crate::{
    compare::{Compare, PairCompare},
    heap,
    tag::{tag_stream, ByValue, Tagged},
};

/// Merges streams that are each sorted according to `cmp`.
///
/// The returned stream is not `Unpin`; pin it (for example with `futures::pin_mut!`) before
/// calling `next` on it.
pub fn merge_streams_by<S, St, F>(cmp: F, streams: S) -> impl Stream<Item = St::Item>
where
    S: IntoIterator<Item = St>,
    St: Stream,
    F: FnMut(&St::Item, &St::Item) -> Ordering,
{
    merge_tagged(cmp, streams.into_iter().map(Some).collect())
}

/// Same as [`merge_streams_by`], with `None` standing in for an absent source.
pub fn merge_optional_streams_by<S, St, F>(cmp: F, streams: S) -> impl Stream<Item = St::Item>
where
    S: IntoIterator<Item = Option<St>>,
    St: Stream,
    F: FnMut(&St::Item, &St::Item) -> Ordering,
{
    merge_tagged(cmp, streams.into_iter().collect())
}

/// Merges streams of key/value pairs with a `(key1, value1, key2, value2)` comparator.
pub fn merge_pair_streams_by<S, St, K, V, F>(cmp: F, streams: S) -> impl Stream<Item = (K, V)>
where
    S: IntoIterator<Item = St>,
    St: Stream<Item = (K, V)>,
    F: FnMut(&K, &V, &K, &V) -> Ordering,
{
    merge_tagged(PairCompare(cmp), streams.into_iter().map(Some).collect())
}

fn merge_tagged<St, C>(cmp: C, streams: Vec<Option<St>>) -> impl Stream<Item = St::Item>
where
    St: Stream,
    C: Compare<St::Item>,
{
    if streams.iter().all(Option::is_none) {
        return futures::stream::empty().left_stream();
    }

    let merged = stream! {
        let mut cmp = ByValue(cmp);
        let mut handles: Vec<Option<Pin<Box<_>>>> = streams
            .into_iter()
            .enumerate()
            .map(|(index, source)| source.map(|s| Box::pin(tag_stream(index, s))))
            .collect();

        let mut frontier: Vec<Tagged<St::Item>> = Vec::with_capacity(handles.len());
        for slot in handles.iter_mut() {
            if let Some(handle) = slot {
                let first = handle.next().await;
                match first {
                    Some(first) => frontier.push(first),
                    None => *slot = None,
                }
            }
        }
        heap::heapify(&mut frontier, &mut cmp.less_fn());

        debug!(
            sources = handles.len(),
            active = frontier.len(),
            "stream frontier initialized"
        );

        loop {
            let min = match heap::pop(&mut frontier, &mut cmp.less_fn()) {
                Some(min) => min,
                None => break,
            };
            let index = min.index;
            yield min.value;

            if let Some(handle) = handles[index].as_mut() {
                let next = handle.next().await;
                match next {
                    Some(next) => heap::push(&mut frontier, next, &mut cmp.less_fn()),
                    None => {
                        trace!(source = index, "stream source exhausted");
                        handles[index] = None;
                    }
                }
            }
        }
    };

    merged.right_stream()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::pin_mut;

    use crate::test_support::Probe;

    use super::*;

    #[tokio::test]
    async fn test_merge_streams() {
        let merged = merge_streams_by(
            |a: &i32, b: &i32| a.cmp(b),
            [
                tokio_stream::iter(vec![1, 5, 9]),
                tokio_stream::iter(vec![2, 6, 10]),
                tokio_stream::iter(vec![3, 7, 11]),
                tokio_stream::iter(vec![4, 8, 12]),
            ],
        );

        assert_eq!((1..=12).collect::<Vec<_>>(), merged.collect::<Vec<_>>().await);
    }

    #[tokio::test]
    async fn test_merge_streams_stability() {
        let merged = merge_streams_by(
            |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0),
            [
                tokio_stream::iter(vec![(1, 'a'), (3, 'a'), (5, 'a')]),
                tokio_stream::iter(vec![(1, 'b'), (3, 'b'), (5, 'b')]),
            ],
        );

        assert_eq!(
            vec![(1, 'a'), (1, 'b'), (3, 'a'), (3, 'b'), (5, 'a'), (5, 'b')],
            merged.collect::<Vec<_>>().await
        );
    }

    #[tokio::test]
    async fn test_no_streams() {
        let merged = merge_streams_by(
            |a: &i32, b: &i32| a.cmp(b),
            Vec::<tokio_stream::Iter<std::vec::IntoIter<i32>>>::new(),
        );

        assert!(merged.collect::<Vec<_>>().await.is_empty());
    }

    #[tokio::test]
    async fn test_absent_streams() {
        let cmp = |a: &i32, b: &i32| a.cmp(b);

        let none = merge_optional_streams_by(
            cmp,
            [None::<tokio_stream::Iter<std::vec::IntoIter<i32>>>, None],
        );
        assert!(none.collect::<Vec<_>>().await.is_empty());

        let some = merge_optional_streams_by(
            cmp,
            [
                None,
                Some(tokio_stream::iter(vec![2, 4])),
                Some(tokio_stream::iter(vec![])),
                Some(tokio_stream::iter(vec![1, 3])),
            ],
        );
        assert_eq!(vec![1, 2, 3, 4], some.collect::<Vec<_>>().await);
    }

    #[tokio::test]
    async fn test_early_termination() {
        let first = Probe::new();
        let second = Probe::new();

        {
            let merged = merge_streams_by(
                |a: &i32, b: &i32| a.cmp(b),
                [
                    tokio_stream::iter(first.wrap(1..)),
                    tokio_stream::iter(second.wrap(1..)),
                ],
            );
            pin_mut!(merged);

            let mut got = Vec::new();
            while let Some(v) = merged.next().await {
                got.push(v);
                if got.len() == 3 {
                    break;
                }
            }

            assert_eq!(vec![1, 1, 2], got);
            assert_eq!(4, first.pulls() + second.pulls());
        }

        assert!(first.dropped());
        assert!(second.dropped());
        assert_eq!(4, first.pulls() + second.pulls());
    }

    #[tokio::test]
    async fn test_nothing_pulled_before_first_poll() {
        let probe = Probe::new();

        let merged = merge_streams_by(
            |a: &i32, b: &i32| a.cmp(b),
            [tokio_stream::iter(probe.wrap(vec![1, 2]))],
        );
        assert_eq!(0, probe.pulls());

        pin_mut!(merged);
        assert_eq!(Some(1), merged.next().await);
        assert_eq!(1, probe.pulls());
    }

    #[tokio::test]
    async fn test_merge_pair_streams() {
        let merged = merge_pair_streams_by(
            |k1: &String, _: &u32, k2: &String, _: &u32| k1.cmp(k2),
            [
                tokio_stream::iter(vec![("a".to_string(), 1), ("c".to_string(), 3)]),
                tokio_stream::iter(vec![("a".to_string(), 10), ("b".to_string(), 2)]),
            ],
        );

        assert_eq!(
            vec![
                ("a".to_string(), 1),
                ("a".to_string(), 10),
                ("b".to_string(), 2),
                ("c".to_string(), 3),
            ],
            merged.collect::<Vec<_>>().await
        );
    }

    #[tokio::test]
    async fn test_merge_channels() {
        let (tx_a, rx_a) = async_channel::unbounded();
        let (tx_b, rx_b) = async_channel::unbounded();

        let producer = tokio::spawn(async move {
            for v in [1, 4, 7] {
                tx_a.send(v).await.unwrap();
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });
        for v in [2, 3, 8, 9] {
            tx_b.send(v).await.unwrap();
        }
        drop(tx_b);

        let merged = merge_streams_by(|a: &i32, b: &i32| a.cmp(b), [rx_a, rx_b]);

        assert_eq!(vec![1, 2, 3, 4, 7, 8, 9], merged.collect::<Vec<_>>().await);
        producer.await.unwrap();
    }
}
