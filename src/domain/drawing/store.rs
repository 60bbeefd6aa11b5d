use super::persistence::DrawingRepository;
use super::shapes::{Shape, ShapeId};
use crate::domain::logging::{LogComponent, get_time_provider};
use crate::log_error;

/// Owns the user's shapes in creation order and persists on every mutation.
///
/// The in-memory list is authoritative: a failed write is logged and the
/// mutation still stands.
pub struct ShapeStore {
    shapes: Vec<Shape>,
    repository: Option<DrawingRepository>,
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ShapeStore {
    /// Store backed by `repository`, seeded from whatever it holds.
    pub fn open(repository: DrawingRepository) -> Self {
        let shapes = repository.load();
        Self { shapes, repository: Some(repository) }
    }

    /// Store without persistence.
    pub fn in_memory() -> Self {
        Self { shapes: Vec::new(), repository: None }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| &shape.id == id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Append a committed shape. Returns `false` if the id is already taken.
    pub fn add(&mut self, shape: Shape) -> bool {
        if self.contains(&shape.id) {
            return false;
        }
        self.shapes.push(shape);
        self.persist();
        true
    }

    /// Overwrite the shape with the same id in place. Returns `false` if absent.
    pub fn replace(&mut self, shape: Shape) -> bool {
        let Some(slot) = self.shapes.iter_mut().find(|existing| existing.id == shape.id) else {
            return false;
        };
        *slot = shape;
        self.persist();
        true
    }

    /// Drop the most recently committed shape.
    pub fn undo(&mut self) -> Option<Shape> {
        let removed = self.shapes.pop()?;
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.persist();
    }

    fn persist(&self) {
        let Some(repository) = &self.repository else {
            return;
        };
        let saved_at = get_time_provider().current_timestamp() as i64;
        if let Err(error) = repository.save(&self.shapes, saved_at) {
            log_error!(LogComponent::Domain("ShapeStore"), "persisting drawings failed: {}", error);
        }
    }
}
