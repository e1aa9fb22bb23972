use u8arena::{Arena, ArenaError, Scope};

#[test]
fn test_scope_restores_cursor() {
    let mut backing = [0u8; 128];
    let arena = Arena::new(&mut backing, "test");

    arena.alloc(24, 1).unwrap();
    let before = arena.len();

    {
        // Safety: nothing allocated inside the scope escapes the block.
        let _scope = unsafe { Scope::enter(&arena) };
        arena.alloc(40, 1).unwrap();
        arena.alloc(8, 1).unwrap();
        assert!(arena.len() > before);
    }

    assert_eq!(arena.len(), before);
}

#[test]
fn test_scope_restores_on_error_path() {
    fn failing(arena: &Arena) -> Result<(), ArenaError> {
        // Safety: the scratch allocations stay inside this function.
        let _scope = unsafe { Scope::enter(arena) };
        arena.alloc(8, 1)?;
        arena.alloc(1024, 1)?; // does not fit, propagates out
        Ok(())
    }

    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "test");
    arena.alloc(16, 1).unwrap();
    let before = arena.len();

    assert!(failing(&arena).is_err());
    assert_eq!(arena.len(), before);
}

#[test]
fn test_nested_scopes() {
    let mut backing = [0u8; 256];
    let arena = Arena::new(&mut backing, "test");

    // Safety: scope-local allocations do not escape their blocks.
    let outer = unsafe { Scope::enter(&arena) };
    arena.alloc(10, 1).unwrap();
    let mid = arena.len();
    {
        let _inner = unsafe { Scope::enter(&arena) };
        arena.alloc(100, 1).unwrap();
    }
    assert_eq!(arena.len(), mid);
    drop(outer);
    assert_eq!(arena.len(), 0);
}

#[test]
fn test_scope_saved_position() {
    let mut backing = [0u8; 64];
    let arena = Arena::new(&mut backing, "test");

    arena.alloc(8, 1).unwrap();
    // Safety: no scope-local allocations are made at all.
    let scope = unsafe { Scope::enter(&arena) };
    assert_eq!(scope.saved(), 8);
}
