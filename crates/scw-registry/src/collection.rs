//! Identifier-keyed storage for one resource kind.

use tracing::warn;

/// Anything stored in a [`Collection`]: addressed by its provider id.
pub trait Resource {
    fn id(&self) -> &str;
}

/// Resources of one kind, unique by id, kept in provider listing order so
/// "first match" lookups are deterministic.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Resource> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a full provider listing. Later duplicates of an id are
    /// dropped.
    pub fn from_listing(listing: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for item in listing {
            if collection.contains(item.id()) {
                warn!(id = item.id(), "duplicate id in provider listing, keeping first");
                continue;
            }
            collection.items.push(item);
        }
        collection
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// First entry matching `pred`, in listing order.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| pred(item))
    }

    /// Insert or replace by id. A replaced entry keeps its position.
    pub fn insert(&mut self, item: T) -> Option<T> {
        match self.items.iter().position(|existing| existing.id() == item.id()) {
            Some(idx) => Some(std::mem::replace(&mut self.items[idx], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: Resource> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
