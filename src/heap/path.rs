use crate::{
    error::HeapError,
    heap::{Heap, kind, ptr::ObjPtr},
};

/// An addressable pointer slot: a root-table entry, or a field word inside
/// the active space.
///
/// `get` reads through the slot and `set` writes through it, so one
/// traversal serves both.
pub(crate) enum Slot<'p> {
    Root(&'p str),
    Field(usize),
}

impl Heap {
    /// Walks a `[root, field, field, …]` path to the slot it names.
    ///
    /// A single-segment path addresses the root entry itself, whether or not
    /// it currently exists (`set` may be about to create it). Longer paths
    /// start at the root's pointer and step through one named field per
    /// segment.
    pub(crate) fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Slot<'p>, HeapError> {
        let Some((&root, rest)) = path.split_first() else {
            return Err(HeapError::UnknownRoot(String::new()));
        };

        if rest.is_empty() {
            return Ok(Slot::Root(root));
        }

        let mut slot = self.field_location(self.root(root)?, rest[0])?;
        for segment in &rest[1..] {
            let ptr = ObjPtr::from_word(self.active.read_word(slot));
            slot = self.field_location(ptr, segment)?;
        }

        Ok(Slot::Field(slot))
    }

    /// Byte offset of the field `segment` names on the object at `ptr`.
    fn field_location(&self, ptr: ObjPtr, segment: &str) -> Result<usize, HeapError> {
        if ptr.is_nil() {
            return Err(HeapError::NilDereference {
                segment: segment.to_owned(),
            });
        }

        let at = ptr.offset();
        let kind = kind::decode(&self.active, at)?;

        match kind.field_slot(segment) {
            Some(slot) => Ok(at + kind::slot_offset(slot)),
            None => Err(HeapError::UnknownField {
                kind,
                field: segment.to_owned(),
            }),
        }
    }
}
