//! Generation-checked handles into typed arenas
//!
//! Removing a value bumps the generation of its slot, so every handle issued
//! before the removal resolves to `None` from then on, even after the slot is
//! reused.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed index + generation into an [`Arena`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn from_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

/// Slot storage addressed by [`Handle`]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Insert a value, returns its handle
    pub fn insert(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free_indices.pop() {
            self.slots[index] = Some(value);
            return Handle::from_parts(index as u32, self.generations[index]);
        }

        let index = self.slots.len();
        self.slots.push(Some(value));
        self.generations.push(0);
        Handle::from_parts(index as u32, 0)
    }

    fn slot(&self, handle: Handle<T>) -> Option<usize> {
        let index = handle.index as usize;
        (index < self.slots.len() && self.generations[index] == handle.generation).then_some(index)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slot(handle).and_then(|index| self.slots[index].as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slot(handle).and_then(|index| self.slots[index].as_mut())
    }

    /// Remove a value, bumping the generation counter
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = self.slot(handle)?;
        let removed = self.slots[index].take();
        if removed.is_some() {
            self.generations[index] = self.generations[index].wrapping_add(1);
            self.free_indices.push(index);
        }
        removed
    }

    /// Check if a handle is still valid
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Iterator over all live values
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|value| (Handle::from_parts(index as u32, self.generations[index]), value))
        })
    }

    /// Handles of all live values
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Remove everything. Outstanding handles become stale.
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].take().is_some() {
                self.generations[index] = self.generations[index].wrapping_add(1);
                self.free_indices.push(index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut arena = Arena::new();
        let old = arena.insert(1);
        arena.remove(old);
        let new = arena.insert(2);

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(!arena.contains(old));
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut arena = Arena::new();
        let handles: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.clear();

        assert!(arena.is_empty());
        assert!(handles.iter().all(|h| !arena.contains(*h)));
        assert_eq!(arena.iter().count(), 0);
    }
}
