use crate::core::Arena;

/// A scoped rewind of an [`Arena`] cursor.
///
/// On construction the scope records the cursor; on drop it restores it,
/// on every exit path including error propagation. Everything allocated
/// during the scope is reclaimed wholesale, which makes a scope the right
/// tool for scratch working sets whose peak size tracks nesting depth
/// rather than input size.
#[derive(Debug)]
pub struct Scope<'a, 'buf> {
    arena: &'a Arena<'buf>,
    saved: usize,
}

impl<'a, 'buf> Scope<'a, 'buf> {
    /// Enters a scope, recording the current cursor.
    ///
    /// # Safety
    ///
    /// When the scope drops, the cursor rewinds and every allocation made
    /// from `arena` after this call becomes dead storage. The caller must
    /// ensure none of those allocations (references, pointers, committed
    /// checkout slices) is used after the scope ends. The borrow checker
    /// cannot see this because allocations borrow the arena, not the
    /// scope.
    #[must_use]
    #[allow(unsafe_code)]
    pub unsafe fn enter(arena: &'a Arena<'buf>) -> Self {
        Scope {
            arena,
            saved: arena.len(),
        }
    }

    /// Returns the cursor position recorded at entry.
    #[must_use]
    pub fn saved(&self) -> usize {
        self.saved
    }
}

impl Drop for Scope<'_, '_> {
    fn drop(&mut self) {
        self.arena.set_cursor(self.saved);
    }
}
