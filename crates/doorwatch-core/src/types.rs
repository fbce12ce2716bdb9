use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used for a face that matches nobody on the roster.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Face encoding vector (128-dimensional for dlib-style encoders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compute Euclidean distance between two embeddings.
    ///
    /// Embeddings of different lengths are infinitely far apart.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return f32::INFINITY;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// Opaque transport address of a person (a Telegram chat id, for example).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub String);

impl ContactId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A known person: name, reference encoding and where to reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub encoding: Embedding,
    pub contact_id: ContactId,
}

/// Decision for one detected face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Identified(String),
    Unknown,
}

impl Verdict {
    /// Name shown in notifications; `"Unknown"` for unmatched faces.
    pub fn display_name(&self) -> &str {
        match self {
            Verdict::Identified(name) => name,
            Verdict::Unknown => UNKNOWN_NAME,
        }
    }

    /// Roster name, if the face was identified.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Verdict::Identified(name) => Some(name),
            Verdict::Unknown => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
