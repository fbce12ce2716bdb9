//! Nearest-neighbour matching of a face encoding against the roster.

use crate::roster::Roster;
use crate::types::{Embedding, Verdict};

/// Distance at or below which two encodings are considered the same face.
pub const DEFAULT_TOLERANCE: f32 = 0.6;

/// Boolean match predicate: `distance(a, b) <= tolerance`.
pub fn is_match(a: &Embedding, b: &Embedding, tolerance: f32) -> bool {
    a.euclidean_distance(b) <= tolerance
}

/// Closest roster entry for a query encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index into the roster.
    pub index: usize,
    pub distance: f32,
    /// Whether the entry passed the tolerance check on its own.
    pub matched: bool,
}

/// Strategy for deciding who, if anyone, a face encoding belongs to.
pub trait Matcher {
    fn identify(&self, query: &Embedding, roster: &Roster) -> Verdict;
}

/// Euclidean distance matcher with a fixed tolerance.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanMatcher {
    pub tolerance: f32,
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl EuclideanMatcher {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Argmin over roster distances. Ties go to the earliest entry.
    ///
    /// The match flag is evaluated per entry independently of the argmin, so a
    /// closest-but-too-far entry comes back with `matched == false`.
    pub fn nearest(&self, query: &Embedding, roster: &Roster) -> Option<Nearest> {
        let mut best: Option<Nearest> = None;

        for (index, person) in roster.iter().enumerate() {
            let distance = query.euclidean_distance(&person.encoding);
            let matched = is_match(query, &person.encoding, self.tolerance);
            let closer = match &best {
                None => true,
                Some(b) => distance < b.distance,
            };
            if closer {
                best = Some(Nearest {
                    index,
                    distance,
                    matched,
                });
            }
        }

        best
    }
}

impl Matcher for EuclideanMatcher {
    fn identify(&self, query: &Embedding, roster: &Roster) -> Verdict {
        match self.nearest(query, roster) {
            Some(n) if n.matched => {
                let name = &roster.people()[n.index].name;
                tracing::debug!(name = %name, distance = n.distance, "face identified");
                Verdict::Identified(name.clone())
            }
            Some(n) => {
                tracing::debug!(distance = n.distance, "closest roster entry out of tolerance");
                Verdict::Unknown
            }
            None => Verdict::Unknown,
        }
    }
}
