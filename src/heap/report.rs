use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::heap::kind::Kind;

/// One surviving object: its identity number and kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Survivor {
    pub id: u32,
    pub kind: Kind,
}

/// The outcome of a collection: every object still reachable from the root
/// table, ordered ascending by identity number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurvivorReport {
    entries: Vec<Survivor>,
}

impl SurvivorReport {
    /// Copy order is breadth-first, not allocation order, so the entries
    /// are sorted here.
    pub(crate) fn new(entries: impl IntoIterator<Item = Survivor>) -> Self {
        SurvivorReport {
            entries: entries.into_iter().sorted_by_key(|s| s.id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Survivor> {
        self.entries.iter()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|s| s.id == id)
    }
}

impl<'a> IntoIterator for &'a SurvivorReport {
    type Item = &'a Survivor;
    type IntoIter = std::slice::Iter<'a, Survivor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Display for SurvivorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "objects in active space:")?;
        for s in &self.entries {
            writeln!(f, " - {}:{}", s.id, s.kind)?;
        }

        Ok(())
    }
}
