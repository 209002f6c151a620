//! Binary min-heap operations over a `Vec`.
//!
//! `BinaryHeap` needs an `Ord` element, but merge ordering comes from a caller supplied
//! comparator, so the heap is kept as a plain vector and every operation takes the `less`
//! predicate explicitly. The element at index 0 is always the minimum.

/// Establishes the heap property over the whole vector.
pub(crate) fn heapify<T, L>(data: &mut [T], less: &mut L)
where
    L: FnMut(&T, &T) -> bool,
{
    let n = data.len();
    for pos in (0..n / 2).rev() {
        sift_down(data, pos, less);
    }
}

pub(crate) fn push<T, L>(data: &mut Vec<T>, item: T, less: &mut L)
where
    L: FnMut(&T, &T) -> bool,
{
    data.push(item);
    let last = data.len() - 1;
    sift_up(data, last, less);
}

/// Removes and returns the minimum.
pub(crate) fn pop<T, L>(data: &mut Vec<T>, less: &mut L) -> Option<T>
where
    L: FnMut(&T, &T) -> bool,
{
    if data.is_empty() {
        return None;
    }

    let min = data.swap_remove(0);
    sift_down(data, 0, less);
    Some(min)
}

fn sift_up<T, L>(data: &mut [T], mut pos: usize, less: &mut L)
where
    L: FnMut(&T, &T) -> bool,
{
    while pos > 0 {
        let parent = (pos - 1) / 2;
        if !less(&data[pos], &data[parent]) {
            break;
        }
        data.swap(pos, parent);
        pos = parent;
    }
}

fn sift_down<T, L>(data: &mut [T], mut pos: usize, less: &mut L)
where
    L: FnMut(&T, &T) -> bool,
{
    let n = data.len();
    loop {
        let left = 2 * pos + 1;
        if left >= n {
            break;
        }

        let right = left + 1;
        let child = if right < n && less(&data[right], &data[left]) {
            right
        } else {
            left
        };

        if !less(&data[child], &data[pos]) {
            break;
        }
        data.swap(pos, child);
        pos = child;
    }
}
