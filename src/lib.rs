pub mod error;
pub mod heap;

pub use error::HeapError;
pub use heap::{Field, Heap, Kind, ObjPtr, Survivor, SurvivorReport};
