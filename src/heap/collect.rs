use std::mem;

use fnv::FnvHashMap;

use crate::{
    error::HeapError,
    heap::{
        Heap,
        arena::Space,
        kind,
        ptr::ObjPtr,
        report::{Survivor, SurvivorReport},
    },
};

/// Collection-scoped evacuation state.
///
/// Borrows the two semispaces disjointly so both the root phase and the scan
/// phase can call [`Evacuation::relocate`]: reads come from the old active
/// space, copies and pointer rewrites go to the reserve space. Dropped when
/// the collection finishes, forwarding table included.
struct Evacuation<'h> {
    from: &'h Space,
    to: &'h mut Space,
    /// Old offset → new offset for every object copied this cycle.
    forward: FnvHashMap<usize, usize>,
    /// Next free offset in the reserve space; the upper bound of the
    /// copied-but-unscanned region.
    cursor: usize,
}

impl Evacuation<'_> {
    /// The copy primitive: returns where `ptr` lives after this collection.
    ///
    /// Nil passes through untouched. A pointer whose target was already
    /// copied is rewritten from the forwarding table without growing the
    /// cursor, which is what keeps shared objects single-copied and cycles
    /// finite. Otherwise the object's bytes are copied verbatim — its fields
    /// still hold old-space pointers until the scan reaches it.
    fn relocate(&mut self, ptr: ObjPtr) -> Result<ObjPtr, HeapError> {
        if ptr.is_nil() {
            return Ok(ptr);
        }

        let old = ptr.offset();
        if let Some(&new) = self.forward.get(&old) {
            return Ok(ObjPtr::from_offset(new));
        }

        let kind = kind::decode(self.from, old)?;
        let new = self.cursor;
        self.to.copy_object(self.from, old, new, kind.size());
        self.forward.insert(old, new);
        self.cursor += kind.size();

        Ok(ObjPtr::from_offset(new))
    }

    /// Relocates every pointer field of the copied object at `at` in the
    /// reserve space, in place. Returns the object's size so the scan can
    /// advance.
    fn scan_object(&mut self, at: usize) -> Result<usize, HeapError> {
        let kind = kind::decode(self.to, at)?;

        for field in kind.fields() {
            let slot = at + kind::slot_offset(field.slot);
            let ptr = ObjPtr::from_word(self.to.read_word(slot));
            let moved = self.relocate(ptr)?;
            self.to.write_word(slot, moved.word());
        }

        Ok(kind.size())
    }
}

impl Heap {
    /// Runs one full collection: copies every object reachable from the
    /// root table into the reserve space, swaps the spaces, and reports the
    /// survivors ordered by identity number.
    ///
    /// Roots are relocated first. After that the region between the scan
    /// cursor and the allocation cursor *is* the work queue: each object in
    /// it has been copied but its fields still point into the old space.
    /// The allocation cursor only grows when an unforwarded object is first
    /// copied, so the scan always catches up — cycles included.
    ///
    /// On a well-formed heap this cannot fail: live data fits the reserve
    /// space because it fit the active space. [`HeapError::CorruptHeap`]
    /// means the heap was already broken before this collection started.
    pub fn collect(&mut self) -> Result<SurvivorReport, HeapError> {
        let live_before = self.bump;
        let mut evac = Evacuation {
            from: &self.active,
            to: &mut self.reserve,
            forward: FnvHashMap::default(),
            cursor: 0,
        };

        for ptr in self.roots.values_mut() {
            *ptr = evac.relocate(*ptr)?;
        }

        let mut scan = 0;
        while scan < evac.cursor {
            scan += evac.scan_object(scan)?;
        }

        self.bump = evac.cursor;
        mem::swap(&mut self.active, &mut self.reserve);
        log::trace!("collected: {live_before} bytes before, {} live after", self.bump);

        self.survivors()
    }

    /// Enumerates every object in the live prefix of the active space.
    fn survivors(&self) -> Result<SurvivorReport, HeapError> {
        let mut entries = Vec::new();

        let mut at = 0;
        while at < self.bump {
            let kind = kind::decode(&self.active, at)?;
            let id = self.active.read_word(at + kind::ID_OFFSET) as u32;
            entries.push(Survivor { id, kind });
            at += kind.size();
        }

        Ok(SurvivorReport::new(entries))
    }
}
