//! doorwatch-core — Who is at the door, and who should hear about it.
//!
//! Matches face encodings against a roster of known persons, suppresses
//! repeated sightings of the same visitors and composes the notification that
//! goes out to everyone else on the roster.

pub mod classifier;
pub mod matcher;
pub mod notification;
pub mod observation;
pub mod pipeline;
pub mod roster;
pub mod transport;
pub mod types;
pub mod vision;

#[cfg(test)]
mod testing;

pub use matcher::{EuclideanMatcher, Matcher, DEFAULT_TOLERANCE};
pub use notification::{DeliveryReport, Notification, NotifyError};
pub use observation::ObservationState;
pub use pipeline::{Doorbell, Observation};
pub use roster::{Roster, RosterError};
pub use transport::{Transport, TransportError};
pub use types::{ContactId, Embedding, Person, Verdict};
pub use vision::{FaceEncoder, VisionError};
