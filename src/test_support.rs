use std::{cell::Cell, rc::Rc};

/// Observes a source from the outside: how often it was pulled and whether it was dropped.
#[derive(Debug, Default, Clone)]
pub(crate) struct Probe {
    pulls: Rc<Cell<usize>>,
    dropped: Rc<Cell<bool>>,
}

impl Probe {
    pub(crate) fn new() -> Self {
        Probe::default()
    }

    pub(crate) fn wrap<I: IntoIterator>(&self, items: I) -> Counted<I::IntoIter> {
        Counted {
            iter: items.into_iter(),
            probe: self.clone(),
        }
    }

    pub(crate) fn pulls(&self) -> usize {
        self.pulls.get()
    }

    pub(crate) fn dropped(&self) -> bool {
        self.dropped.get()
    }
}

#[derive(Debug)]
pub(crate) struct Counted<I> {
    iter: I,
    probe: Probe,
}

impl<I: Iterator> Iterator for Counted<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.probe.pulls.set(self.probe.pulls.get() + 1);
        self.iter.next()
    }
}

impl<I> Drop for Counted<I> {
    fn drop(&mut self) {
        self.probe.dropped.set(true);
    }
}
