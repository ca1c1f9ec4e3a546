//! Entity implementation

use slotmap::Key;

slotmap::new_key_type! {
    /// Entity identifier
    ///
    /// Generational: a despawned entity's identifier is never handed out
    /// again, so stale references compare unequal to new entities.
    pub struct Entity;
}

impl Entity {
    /// Get the entity ID (index and generation packed together)
    pub fn id(&self) -> u64 {
        self.data().as_ffi()
    }
}
