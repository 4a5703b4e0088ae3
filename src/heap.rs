mod arena;
mod collect;
mod kind;
mod path;
mod ptr;
mod report;


use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    error::HeapError,
    heap::{arena::Space, path::Slot},
};

pub use kind::{Field, Kind};
pub use ptr::ObjPtr;
pub use report::{Survivor, SurvivorReport};

/// A fixed-size semispace heap.
///
/// The arena is split into two equal halves. Allocation bumps a cursor
/// through the active half; when it would overrun, every object reachable
/// from the root table is copied into the reserve half, the halves swap
/// roles, and whatever was not copied is gone. Pointers are offsets local to
/// the active half, so roots and live fields stay meaningful across the
/// swap.
///
/// A `Heap` is a plain owned value: no globals, any number of independent
/// heaps can coexist.
pub struct Heap {
    active: Space,
    reserve: Space,
    /// Next free offset in the active space. Monotonic between collections.
    bump: usize,
    roots: BTreeMap<String, ObjPtr>,
    next_id: u32,
}

impl Heap {
    /// Creates a heap of `heap_size` total bytes, half per semispace.
    ///
    /// # Panics
    /// Panics if `heap_size` is odd.
    pub fn new(heap_size: usize) -> Self {
        assert!(
            heap_size % 2 == 0,
            "heap size must split into two equal semispaces"
        );

        Heap {
            active: Space::new(heap_size / 2),
            reserve: Space::new(heap_size / 2),
            bump: 0,
            roots: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Reserves `size` bytes in the active space.
    ///
    /// If the bump cursor would overrun the semispace, a full collection
    /// runs first; if the space is still too small afterwards the request
    /// fails with [`HeapError::OutOfMemory`]. No partial allocation, no
    /// growth.
    fn allocate(&mut self, size: usize) -> Result<usize, HeapError> {
        if self.bump + size > self.active.capacity() {
            log::trace!("allocating {size} bytes overruns the active space, collecting");
            let report = self.collect()?;
            log::debug!("implicit collection survivors:\n{report}");
        }

        if self.bump + size > self.active.capacity() {
            return Err(HeapError::OutOfMemory {
                requested: size,
                free: self.active.capacity() - self.bump,
            });
        }

        let at = self.bump;
        self.bump += size;
        Ok(at)
    }

    /// Allocates a fresh object of `kind`: a new identity number, both
    /// pointer fields nil.
    pub fn allocate_kind(&mut self, kind: Kind) -> Result<ObjPtr, HeapError> {
        let at = self.allocate(kind.size())?;

        self.active.write_word(at + kind::TAG_OFFSET, kind.tag());
        self.active
            .write_word(at + kind::ID_OFFSET, self.next_id as i32);
        self.next_id += 1;

        for field in kind.fields() {
            self.active
                .write_word(at + kind::slot_offset(field.slot), ObjPtr::NIL.word());
        }

        Ok(ObjPtr::from_offset(at))
    }

    /// Looks up a root by name.
    pub fn root(&self, name: &str) -> Result<ObjPtr, HeapError> {
        self.roots
            .get(name)
            .copied()
            .ok_or_else(|| HeapError::UnknownRoot(name.to_owned()))
    }

    /// Reads the pointer stored at the slot `path` names.
    pub fn get(&self, path: &[&str]) -> Result<ObjPtr, HeapError> {
        match self.resolve(path)? {
            Slot::Root(name) => self.root(name),
            Slot::Field(at) => Ok(ObjPtr::from_word(self.active.read_word(at))),
        }
    }

    /// Writes `value` to the slot `path` names.
    ///
    /// A single-segment path addresses the root table itself: a non-nil
    /// value assigns (or creates) the root, while a nil value *deletes the
    /// name* — it does not store a nil-valued root, so a later `get` of that
    /// root fails with [`HeapError::UnknownRoot`].
    pub fn set(&mut self, path: &[&str], value: ObjPtr) -> Result<(), HeapError> {
        match self.resolve(path)? {
            Slot::Root(name) => {
                if value.is_nil() {
                    self.roots.remove(name);
                } else {
                    self.roots.insert(name.to_owned(), value);
                }
            }
            Slot::Field(at) => self.active.write_word(at, value.word()),
        }

        Ok(())
    }

    /// Kind of the object `ptr` points at.
    ///
    /// # Panics
    /// Panics if `ptr` is nil; nil points at no object.
    pub fn kind_of(&self, ptr: ObjPtr) -> Result<Kind, HeapError> {
        assert!(!ptr.is_nil(), "nil pointer has no kind");
        kind::decode(&self.active, ptr.offset())
    }

    /// Identity number of the object `ptr` points at. Identity is assigned
    /// at allocation and survives relocation.
    ///
    /// # Panics
    /// Panics if `ptr` is nil; nil points at no object.
    pub fn object_id(&self, ptr: ObjPtr) -> Result<u32, HeapError> {
        assert!(!ptr.is_nil(), "nil pointer has no identity");
        let at = ptr.offset();
        kind::decode(&self.active, at)?;
        Ok(self.active.read_word(at + kind::ID_OFFSET) as u32)
    }

    /// Renders the current arena occupancy: bump cursor, every root, and
    /// every allocated object with its field values. Purely diagnostic.
    pub fn debug_report(&self) -> Result<String, HeapError> {
        let mut out = format!(
            "active space: {} / {} bytes\nroots:\n",
            self.bump,
            self.active.capacity()
        );

        for (name, ptr) in &self.roots {
            out.push_str(&format!(" - {name} -> {ptr}\n"));
        }

        out.push_str("objects:\n");
        let mut at = 0;
        while at < self.bump {
            let kind = kind::decode(&self.active, at)?;
            let id = self.active.read_word(at + kind::ID_OFFSET);
            let fields = kind
                .fields()
                .iter()
                .map(|field| {
                    let word = self.active.read_word(at + kind::slot_offset(field.slot));
                    format!("{}={}", field.name, ObjPtr::from_word(word))
                })
                .join(", ");

            let ptr = ObjPtr::from_offset(at);
            out.push_str(&format!(" - {ptr} {id}:{kind} {{{fields}}}\n"));
            at += kind.size();
        }

        Ok(out)
    }
}
