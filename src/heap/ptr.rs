use std::fmt::{self, Display, Formatter};

/// A pointer to an object in the heap.
///
/// The value is a byte offset local to whichever semispace is currently
/// active, so a live `ObjPtr` means the same object before and after a
/// collection even though the object's real address changes. Any negative
/// value is the nil sentinel; nil is never dereferenced and never relocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjPtr(i32);

impl ObjPtr {
    /// The distinguished "no object" value.
    pub const NIL: ObjPtr = ObjPtr(-1);

    pub fn is_nil(self) -> bool {
        self.0 < 0
    }

    /// Reinterprets a raw field word read out of the arena.
    pub(crate) fn from_word(word: i32) -> Self {
        ObjPtr(word)
    }

    /// The raw word stored in arena field slots.
    pub(crate) fn word(self) -> i32 {
        self.0
    }

    /// Byte offset of the object header in the active space. Callers check
    /// `is_nil` first; nil has no offset.
    pub(crate) fn offset(self) -> usize {
        debug_assert!(!self.is_nil(), "nil pointer has no offset");
        self.0 as usize
    }

    pub(crate) fn from_offset(offset: usize) -> Self {
        ObjPtr(offset as i32)
    }
}

impl Display for ObjPtr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("nil")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}
