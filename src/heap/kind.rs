use std::fmt::{self, Display, Formatter};

use crate::{error::HeapError, heap::arena::Space};

/// Size of one arena cell. Tags, identity numbers, and pointer fields are
/// all single words.
pub(crate) const WORD: usize = size_of::<i32>();

/// Byte offset of the kind tag within an object.
pub(crate) const TAG_OFFSET: usize = 0;
/// Byte offset of the identity number.
pub(crate) const ID_OFFSET: usize = WORD;
/// Byte offset of the first pointer field slot.
pub(crate) const FIELDS_OFFSET: usize = 2 * WORD;

/// The closed set of object kinds the heap can store.
///
/// Every kind is a fixed-size record: a tag word, an identity word, and two
/// pointer fields. The field *names* differ per kind, and the same name may
/// sit in different slots of different kinds (`alt` is slot 1 of a `Span`
/// but slot 0 of a `Knot`), so name lookup always goes through
/// [`Kind::field_slot`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum Kind {
    Fork = 0,
    Span = 1,
    Knot = 2,
}

/// A named pointer field of a kind, with the slot it resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub slot: usize,
}

const fn field(name: &'static str, slot: usize) -> Field {
    Field { name, slot }
}

const FORK_FIELDS: [Field; 2] = [field("left", 0), field("right", 1)];
const SPAN_FIELDS: [Field; 2] = [field("left", 0), field("alt", 1)];
const KNOT_FIELDS: [Field; 2] = [field("alt", 0), field("next", 1)];

impl Kind {
    /// Decodes a tag word. `None` means the word is not an object tag.
    pub fn from_tag(tag: i32) -> Option<Kind> {
        match tag {
            0 => Some(Kind::Fork),
            1 => Some(Kind::Span),
            2 => Some(Kind::Knot),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Fork => "Fork",
            Kind::Span => "Span",
            Kind::Knot => "Knot",
        }
    }

    /// Total byte size of an object of this kind.
    pub fn size(self) -> usize {
        FIELDS_OFFSET + self.fields().len() * WORD
    }

    /// The pointer fields of this kind, in slot order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Kind::Fork => &FORK_FIELDS,
            Kind::Span => &SPAN_FIELDS,
            Kind::Knot => &KNOT_FIELDS,
        }
    }

    /// Resolves a field name to its slot index.
    pub fn field_slot(self, name: &str) -> Option<usize> {
        self.fields()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.slot)
    }
}

/// Byte offset of a field slot within an object.
pub(crate) fn slot_offset(slot: usize) -> usize {
    FIELDS_OFFSET + slot * WORD
}

/// Decodes the object header at `at` in `space`.
pub(crate) fn decode(space: &Space, at: usize) -> Result<Kind, HeapError> {
    let tag = space.read_word(at + TAG_OFFSET);
    Kind::from_tag(tag).ok_or(HeapError::CorruptHeap { offset: at, tag })
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
