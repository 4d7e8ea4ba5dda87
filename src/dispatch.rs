//! Drag-state registry shared by the picker instances of one application.
//!
//! A pointer release anywhere must stop the paint drag of every open
//! picker. Instead of each widget installing its own document-wide
//! listener, the application owns one dispatcher, registers each picker
//! with it, and routes gesture callbacks through it.

use std::collections::HashMap;

/// What a drag that began on a day cell does to the days it crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// The drag started on an unchosen day and paints days in.
    Add,
    /// The drag started on a chosen day and paints days out.
    Remove,
}

/// Identifies one registered picker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

/// Application-owned registry of in-flight drags.
#[derive(Debug, Default)]
pub struct DragDispatcher {
    next_id: u64,
    active: HashMap<WidgetId, DragMode>,
}

impl DragDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id for a new picker instance.
    pub fn register(&mut self) -> WidgetId {
        self.next_id += 1;
        WidgetId(self.next_id)
    }

    /// Records that a drag started on the given picker.
    pub fn begin(&mut self, id: WidgetId, mode: DragMode) {
        self.active.insert(id, mode);
    }

    /// The picker's in-flight drag mode, if a drag is underway.
    pub fn mode(&self, id: WidgetId) -> Option<DragMode> {
        self.active.get(&id).copied()
    }

    /// Ends the picker's drag, if any.
    pub fn end(&mut self, id: WidgetId) {
        self.active.remove(&id);
    }

    /// Pointer released anywhere: every in-flight drag stops.
    pub fn release_all(&mut self) {
        self.active.clear();
    }
}
