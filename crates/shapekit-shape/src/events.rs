//! Change notifications.
//!
//! A shape emits exactly one [`GeometryChange`] per completed operation
//! (drag end, flip, reset, setter). Intermediate drag positions are never
//! published. Listeners run synchronously on the caller's thread.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use shapekit_core::{shared, Listener, SharedVec};
use uuid::Uuid;

use crate::state::ShapeSnapshot;

/// Stable identity of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A completed geometry change, with enough state to undo or redo it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryChange {
    pub shape: ShapeId,
    /// Human-readable action name ("Resize", "Rotate", ...).
    pub action: String,
    pub before: ShapeSnapshot,
    pub after: ShapeSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener registry for [`GeometryChange`] notifications.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    listeners: SharedVec<(SubscriptionId, Listener<GeometryChange>)>,
    next_id: Rc<Cell<u64>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: shared(Vec::new()),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&GeometryChange) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Delivers `change` to every listener.
    ///
    /// The listener list is copied first so a listener may subscribe or
    /// unsubscribe while being notified.
    pub fn emit(&self, change: &GeometryChange) {
        let listeners: Vec<Listener<GeometryChange>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
