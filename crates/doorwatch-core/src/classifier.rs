use crate::matcher::Matcher;
use crate::roster::Roster;
use crate::types::{Embedding, Verdict};

/// Classify every face of a frame, in detection order.
///
/// Repeated identities are kept: two faces matching the same person yield two
/// verdicts.
pub fn classify<M: Matcher + ?Sized>(
    matcher: &M,
    encodings: &[Embedding],
    roster: &Roster,
) -> Vec<Verdict> {
    encodings
        .iter()
        .map(|encoding| matcher.identify(encoding, roster))
        .collect()
}
