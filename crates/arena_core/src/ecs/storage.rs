//! # Component Storage
//!
//! Dense component columns indexed by entity id.
//!
//! - Access is O(1) via entity index
//! - Columns grow with the highest id ever allocated and never shrink
//! - A slot's content is meaningless unless the entity's mask bit is set

/// Storage for a single component type.
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Health> = ComponentStorage::new();
/// storage.set(3, Health { current: 50.0, max: 50.0 });
/// ```
#[derive(Clone, Debug)]
pub struct ComponentStorage<C> {
    data: Vec<C>,
}

impl<C: Default> ComponentStorage<C> {
    /// Creates an empty column.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Number of allocated slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no slot was ever allocated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Sets a component, growing the column with defaults if needed.
    pub fn set(&mut self, index: usize, component: C) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, C::default);
        }
        self.data[index] = component;
    }

    /// Resets a slot to its default value.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = C::default();
        }
    }
}

impl<C: Default> Default for ComponentStorage<C> {
    fn default() -> Self {
        Self::new()
    }
}
