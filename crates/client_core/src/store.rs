use std::collections::HashSet;

use shared::domain::OrderId;

/// Ordered, duplicate-free list of order ids known to the session.
///
/// Mutations are synchronous and never perform I/O; the controller is the only
/// caller that applies remote outcomes to it.
#[derive(Debug, Default, Clone)]
pub struct OrderListStore {
    ids: Vec<OrderId>,
    index: HashSet<OrderId>,
}

impl OrderListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole list, keeping the first occurrence of each id.
    pub fn load(&mut self, ids: impl IntoIterator<Item = OrderId>) {
        self.ids.clear();
        self.index.clear();
        for id in ids {
            if self.index.insert(id.clone()) {
                self.ids.push(id);
            }
        }
    }

    /// Appends `id` unless it is already present. Returns whether the list
    /// changed.
    pub fn add(&mut self, id: OrderId) -> bool {
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes `id`, keeping the relative order of the remaining entries.
    /// Returns whether the list changed.
    pub fn remove(&mut self, id: &OrderId) -> bool {
        if !self.index.remove(id) {
            return false;
        }
        if let Some(position) = self.position(id) {
            self.ids.remove(position);
        }
        true
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.index.contains(id)
    }

    pub fn position(&self, id: &OrderId) -> Option<usize> {
        self.ids.iter().position(|known| known == id)
    }

    pub fn get(&self, position: usize) -> Option<&OrderId> {
        self.ids.get(position)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[OrderId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderId> {
        self.ids.iter()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
