//! The set of known persons, loaded once at startup.

use crate::types::{ContactId, Person};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RosterError {
    #[error("duplicate person name: {0}")]
    DuplicateName(String),
    #[error("person name must not be empty")]
    EmptyName,
    #[error("empty face encoding for {0}")]
    EmptyEncoding(String),
    #[error("face encoding for {0} contains NaN or infinite values")]
    NonFiniteEncoding(String),
    #[error("encoding length mismatch for {name}: expected {expected}, got {actual}")]
    EncodingLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Immutable, ordered list of known persons with unique names.
///
/// Iteration order is the configuration order; the matcher breaks distance
/// ties in this order and notifications go out in this order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    people: Vec<Person>,
}

impl Roster {
    /// Build a roster, rejecting duplicate names and inconsistent encodings.
    pub fn new(people: Vec<Person>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        let expected_len = people.first().map(|p| p.encoding.len());

        for person in &people {
            if person.name.trim().is_empty() {
                return Err(RosterError::EmptyName);
            }
            if !seen.insert(person.name.as_str()) {
                return Err(RosterError::DuplicateName(person.name.clone()));
            }
            if person.encoding.is_empty() {
                return Err(RosterError::EmptyEncoding(person.name.clone()));
            }
            if !person.encoding.values.iter().all(|v| v.is_finite()) {
                return Err(RosterError::NonFiniteEncoding(person.name.clone()));
            }
            if let Some(expected) = expected_len {
                if person.encoding.len() != expected {
                    return Err(RosterError::EncodingLength {
                        name: person.name.clone(),
                        expected,
                        actual: person.encoding.len(),
                    });
                }
            }
        }

        Ok(Self { people })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn get(&self, name: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.name == name)
    }

    pub fn contact_of(&self, name: &str) -> Option<&ContactId> {
        self.get(name).map(|p| &p.contact_id)
    }

    /// Length shared by every reference encoding (`None` for an empty roster).
    pub fn encoding_len(&self) -> Option<usize> {
        self.people.first().map(|p| p.encoding.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Embedding;

    fn person(name: &str, values: Vec<f32>) -> Person {
        Person {
            name: name.into(),
            encoding: Embedding::new(values),
            contact_id: ContactId(format!("chat-{name}")),
        }
    }

    #[test]
    fn test_roster_preserves_order() {
        let roster = Roster::new(vec![
            person("Carol", vec![0.0, 1.0]),
            person("Alice", vec![1.0, 0.0]),
        ])
        .unwrap();
        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Alice"]);
        assert_eq!(roster.encoding_len(), Some(2));
    }

    #[test]
    fn test_roster_rejects_duplicate_names() {
        let err = Roster::new(vec![
            person("Alice", vec![1.0, 0.0]),
            person("Alice", vec![0.0, 1.0]),
        ])
        .unwrap_err();
        assert_eq!(err, RosterError::DuplicateName("Alice".into()));
    }

    #[test]
    fn test_roster_rejects_mismatched_encoding_lengths() {
        let err = Roster::new(vec![
            person("Alice", vec![1.0, 0.0]),
            person("Bob", vec![0.0, 1.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, RosterError::EncodingLength { expected: 2, actual: 3, .. }));
    }

    #[test]
    fn test_roster_rejects_empty_encoding() {
        let err = Roster::new(vec![person("Alice", vec![])]).unwrap_err();
        assert_eq!(err, RosterError::EmptyEncoding("Alice".into()));
    }

    #[test]
    fn test_roster_rejects_nan_encoding() {
        // A NaN distance would win the argmin and hide exact matches behind it.
        let err = Roster::new(vec![
            person("Ghost", vec![f32::NAN, 0.0]),
            person("Alice", vec![1.0, 0.0]),
        ])
        .unwrap_err();
        assert_eq!(err, RosterError::NonFiniteEncoding("Ghost".into()));
    }

    #[test]
    fn test_roster_rejects_infinite_encoding() {
        let err = Roster::new(vec![person("Alice", vec![1.0, f32::INFINITY])]).unwrap_err();
        assert_eq!(err, RosterError::NonFiniteEncoding("Alice".into()));
    }

    #[test]
    fn test_roster_rejects_blank_name() {
        assert_eq!(Roster::new(vec![person("  ", vec![1.0])]).unwrap_err(), RosterError::EmptyName);
        assert_eq!(Roster::new(vec![person("", vec![1.0])]).unwrap_err(), RosterError::EmptyName);
    }

    #[test]
    fn test_empty_roster_is_valid() {
        let roster = Roster::new(Vec::new()).unwrap();
        assert!(roster.is_empty());
        assert_eq!(roster.encoding_len(), None);
    }

    #[test]
    fn test_contact_lookup() {
        let roster = Roster::new(vec![person("Bob", vec![1.0])]).unwrap();
        assert_eq!(roster.contact_of("Bob"), Some(&ContactId("chat-Bob".into())));
        assert_eq!(roster.contact_of("Eve"), None);
    }
}
