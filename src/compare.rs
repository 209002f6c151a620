use std::cmp::Ordering;

/// A three-way comparison over two values of the same type.
///
/// Implemented for every `FnMut(&T, &T) -> Ordering`, so plain closures work wherever a
/// `Compare` is expected.
pub trait Compare<T> {
    fn compare(&mut self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Compare<T> for F
where
    F: FnMut(&T, &T) -> Ordering,
{
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders values by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl<T: Ord> Compare<T> for Natural {
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Adapts a four argument comparator `(key1, value1, key2, value2)` so it can order `(K, V)`
/// pairs.
#[derive(Debug, Clone, Copy)]
pub struct PairCompare<F>(pub F);

impl<K, V, F> Compare<(K, V)> for PairCompare<F>
where
    F: FnMut(&K, &V, &K, &V) -> Ordering,
{
    fn compare(&mut self, a: &(K, V), b: &(K, V)) -> Ordering {
        (self.0)(&a.0, &a.1, &b.0, &b.1)
    }
}
