//! I define [`Triple`].

use std::fmt;

use crate::Term;

/// One subject–predicate–object statement.
///
/// Triples are immutable values; "editing" one means removing the old
/// triple and adding a new one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// The subject.
    pub s: Term,
    /// The predicate.
    pub p: Term,
    /// The object.
    pub o: Term,
}

impl Triple {
    /// Assemble a triple.
    pub fn new(s: Term, p: Term, o: Term) -> Triple {
        Triple { s, p, o }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}

// ---------------------------------------------------------------------------------
//                                      tests
// ---------------------------------------------------------------------------------
