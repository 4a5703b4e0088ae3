use thiserror::Error;

use crate::heap::Kind;

/// Every way a heap operation can fail.
///
/// All failures are synchronous `Result` returns and none are retried.
/// [`OutOfMemory`](HeapError::OutOfMemory) and
/// [`CorruptHeap`](HeapError::CorruptHeap) end the current operation
/// entirely; the path errors are reported per call and leave the heap
/// untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HeapError {
    /// A completed collection still left too little room. Live data exceeds
    /// half the arena and there is no growth policy to fall back on.
    #[error("out of memory: need {requested} bytes, {free} free after collection")]
    OutOfMemory { requested: usize, free: usize },

    #[error("no such root: {0}")]
    UnknownRoot(String),

    /// A path traversal stepped through a nil field.
    #[error("nil dereference at path segment {segment:?}")]
    NilDereference { segment: String },

    #[error("no such field: {kind}.{field}")]
    UnknownField { kind: Kind, field: String },

    /// An offset decoded to an unrecognized kind tag. Allocation or
    /// relocation bookkeeping is broken and no further decode can be
    /// trusted.
    #[error("corrupt heap: invalid kind tag {tag} at offset {offset}")]
    CorruptHeap { offset: usize, tag: i32 },
}
