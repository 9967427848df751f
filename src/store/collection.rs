// src/store/collection.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records addressable by a stable key.
pub trait Keyed {
    type Key: PartialEq + fmt::Debug + ?Sized;

    fn key(&self) -> &Self::Key;
}

/// A shared, append-ordered collection of records.
///
/// Cloning the collection clones the handle, not the records. Every access
/// takes the collection lock for the duration of one call only; callbacks
/// passed in must not reach into other collections.
pub struct ObjectStore<T> {
    items: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for ObjectStore<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for ObjectStore<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> fmt::Debug for ObjectStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> ObjectStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, item: T) {
        lock(&self.items).push(item);
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        lock(&self.items).iter().filter(|item| pred(item)).count()
    }

    pub fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        lock(&self.items).iter().any(pred)
    }

    /// Apply `f` to every record, collecting the `Some` results.
    pub fn update_all<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> Vec<R> {
        lock(&self.items).iter_mut().filter_map(&mut f).collect()
    }
}

impl<T: Clone> ObjectStore<T> {
    /// Snapshot of all records in insertion order.
    pub fn all(&self) -> Vec<T> {
        lock(&self.items).clone()
    }

    pub fn last(&self) -> Option<T> {
        lock(&self.items).last().cloned()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        lock(&self.items).iter().find(|item| pred(item)).cloned()
    }

    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        lock(&self.items)
            .iter()
            .filter(|item| pred(item))
            .cloned()
            .collect()
    }
}

impl<T: Keyed> ObjectStore<T> {
    pub fn contains(&self, key: &T::Key) -> bool {
        lock(&self.items).iter().any(|item| item.key() == key)
    }

    /// Mutate the record with `key`, returning `None` if there is none.
    pub fn update<R>(&self, key: &T::Key, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        lock(&self.items)
            .iter_mut()
            .find(|item| item.key() == key)
            .map(f)
    }
}

impl<T: Keyed + Clone> ObjectStore<T> {
    pub fn get(&self, key: &T::Key) -> Option<T> {
        lock(&self.items)
            .iter()
            .find(|item| item.key() == key)
            .cloned()
    }
}
