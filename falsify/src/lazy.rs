//! On-demand, memoized sequences.
//!
//! Result trees hold their children in a [`LazySeq`]: an element is computed
//! only when something walks up to it, and at most once, however many
//! iterators share the sequence. Shrink search therefore pays only for the
//! path it actually explores.

use std::cell::RefCell;
use std::rc::Rc;

struct LazyState<T> {
    forced: Vec<T>,
    source: Option<Box<dyn Iterator<Item = T>>>,
}

/// A lazily forced, memoized, shareable sequence
pub struct LazySeq<T> {
    state: Rc<RefCell<LazyState<T>>>,
}

impl<T> Clone for LazySeq<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> LazySeq<T> {
    /// Wrap an iterator; nothing is pulled from it yet
    pub fn new<I>(source: I) -> Self
    where
        I: Iterator<Item = T> + 'static,
    {
        Self {
            state: Rc::new(RefCell::new(LazyState {
                forced: Vec::new(),
                source: Some(Box::new(source)),
            })),
        }
    }

    /// The empty sequence
    pub fn empty() -> Self {
        Self {
            state: Rc::new(RefCell::new(LazyState {
                forced: Vec::new(),
                source: None,
            })),
        }
    }

    /// The element at `index`, forcing the sequence up to it
    pub fn get(&self, index: usize) -> Option<T> {
        loop {
            let mut source = {
                let mut state = self.state.borrow_mut();
                if let Some(value) = state.forced.get(index) {
                    return Some(value.clone());
                }
                state.source.take()?
            };

            // The borrow is released while the source runs, so forcing may
            // touch other sequences freely.
            let next = source.next();

            let mut state = self.state.borrow_mut();
            match next {
                Some(value) => {
                    state.forced.push(value);
                    state.source = Some(source);
                }
                None => return None,
            }
        }
    }

    /// Iterate from the start, sharing memoized elements
    pub fn iter(&self) -> LazyIter<T> {
        LazyIter {
            seq: self.clone(),
            index: 0,
        }
    }

    /// How many elements have been computed so far
    pub fn forced_len(&self) -> usize {
        self.state.borrow().forced.len()
    }

    /// Map every element lazily
    pub fn map<U, F>(&self, f: F) -> LazySeq<U>
    where
        U: Clone + 'static,
        F: Fn(T) -> U + 'static,
    {
        LazySeq::new(self.iter().map(f))
    }

    /// This sequence followed by `other`
    pub fn chain(&self, other: &LazySeq<T>) -> LazySeq<T> {
        LazySeq::new(self.iter().chain(other.iter()))
    }
}

impl<T: Clone + 'static> FromIterator<T> for LazySeq<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let forced: Vec<T> = iter.into_iter().collect();
        Self {
            state: Rc::new(RefCell::new(LazyState {
                forced,
                source: None,
            })),
        }
    }
}

/// Iterator over a [`LazySeq`]
pub struct LazyIter<T> {
    seq: LazySeq<T>,
    index: usize,
}

impl<T: Clone + 'static> Iterator for LazyIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let value = self.seq.get(self.index)?;
        self.index += 1;
        Some(value)
    }
}
