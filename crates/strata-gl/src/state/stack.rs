use std::rc::Rc;

use crate::gl::Gl;

use super::{DrawSetting, StateKind};

/// Save/apply/restore stack for one piece of pipeline state.
///
/// Performance characteristics:
/// - `push()` / `pop()` are O(1) amortized
/// - snapshot slots are allocated lazily and reused; once warmed, neither
///   operation allocates
/// - storage never shrinks
///
/// Holding an `Rc<dyn Gl>` keeps the stack on the thread that owns the
/// context.
pub struct StateStack<K: StateKind> {
    gl: Rc<dyn Gl>,
    live: K,
    slots: Vec<K::Snapshot>,
    depth: usize,
}

impl<K: StateKind> StateStack<K> {
    /// Creates a stack around `live` with `capacity` pre-allocated slots.
    ///
    /// Nothing is sent to the GPU until `apply()` or `pop()`.
    pub fn new(gl: Rc<dyn Gl>, live: K, capacity: usize) -> Self {
        Self {
            gl,
            live,
            slots: vec![K::Snapshot::default(); capacity],
            depth: 0,
        }
    }

    /// Returns the live (mirrored) state.
    #[inline]
    pub fn current(&self) -> &K {
        &self.live
    }

    /// Returns the live state for editing without applying it.
    #[inline]
    pub fn current_mut(&mut self) -> &mut K {
        &mut self.live
    }

    /// Edits the live state, then applies it.
    pub fn apply_with(&mut self, edit: impl FnOnce(&mut K)) {
        edit(&mut self.live);
        self.apply();
    }

    /// Snapshots saved by open `push()` calls, outermost first.
    #[inline]
    pub fn saved(&self) -> &[K::Snapshot] {
        &self.slots[..self.depth]
    }

    /// Commits the live state to the GPU.
    #[inline]
    pub fn apply(&mut self) {
        self.live.commit(self.gl.as_ref());
    }

    /// Saves the live state. Must be balanced with [`pop`](Self::pop).
    pub fn push(&mut self) {
        self.ensure_capacity(self.depth + 1);
        self.slots[self.depth] = self.live.snapshot();
        self.depth += 1;
    }

    /// Restores the state saved by the most recent unmatched
    /// [`push`](Self::push) and applies it.
    ///
    /// # Panics
    /// Popping an empty stack is a programming error and panics.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0, "{}: pop called without matching push", K::NAME);
        self.depth -= 1;
        self.live.restore(&self.slots[self.depth]);
        self.apply();
    }

    /// Current nesting depth; 0 at rest.
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.depth
    }

    /// Number of materialized snapshot slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn gl(&self) -> &dyn Gl {
        self.gl.as_ref()
    }

    fn ensure_capacity(&mut self, min_cap: usize) {
        let old_cap = self.slots.len();
        if min_cap <= old_cap {
            return;
        }

        let new_cap = (old_cap * 3 / 2 + 1).max(min_cap);
        log::trace!("{}: growing state stack {old_cap} -> {new_cap}", K::NAME);
        self.slots.resize(new_cap, K::Snapshot::default());
    }
}

impl<K: StateKind> DrawSetting for StateStack<K> {
    fn name(&self) -> &'static str {
        K::NAME
    }

    fn apply(&mut self) {
        StateStack::apply(self);
    }

    fn push(&mut self) {
        StateStack::push(self);
    }

    fn pop(&mut self) {
        StateStack::pop(self);
    }

    fn stack_depth(&self) -> usize {
        StateStack::stack_depth(self)
    }
}
