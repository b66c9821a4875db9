//! Small, reusable [`AtomStream`] shapes used by more than one instrument
//! family.

use odb_core::{AtomStream, ConcreteAtom};
use std::collections::VecDeque;

/// A stream that yields exactly one atom, then ends forever. Used for the
/// acquisition sub-sequence, which is always a single atom (§4.4).
pub struct OnceAtomStream(Option<ConcreteAtom>);

impl OnceAtomStream {
    /// Wrap a single atom as a stream.
    pub fn new(atom: ConcreteAtom) -> Self {
        Self(Some(atom))
    }
}

impl AtomStream for OnceAtomStream {
    fn next_atom(&mut self) -> Option<ConcreteAtom> {
        self.0.take()
    }
}

/// A stream backed by an eagerly-built, already-bounded queue of atoms.
///
/// Only appropriate when the full atom count is already known to be
/// small and finite (e.g. GMOS imaging's per-filter exposure count);
/// unbounded science streams must instead compute each atom on demand.
pub struct VecAtomStream(VecDeque<ConcreteAtom>);

impl VecAtomStream {
    /// Wrap a pre-built list of atoms as a stream, in order.
    pub fn new(atoms: Vec<ConcreteAtom>) -> Self {
        Self(atoms.into())
    }
}

impl AtomStream for VecAtomStream {
    fn next_atom(&mut self) -> Option<ConcreteAtom> {
        self.0.pop_front()
    }
}
