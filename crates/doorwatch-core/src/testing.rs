//! Test fakes shared by the unit tests of this crate.

use crate::roster::Roster;
use crate::transport::{Transport, TransportError};
use crate::types::{ContactId, Embedding, Person};

/// Roster where person `i` has a one-hot encoding at position `i` and a contact
/// id equal to the lowercased name.
pub fn roster(names: &[&str]) -> Roster {
    let dim = names.len().max(1);
    Roster::new(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut values = vec![0.0; dim];
                values[i] = 1.0;
                Person {
                    name: name.to_string(),
                    encoding: Embedding::new(values),
                    contact_id: ContactId(name.to_lowercase()),
                }
            })
            .collect(),
    )
    .unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message(ContactId),
    Photo(ContactId),
}

/// Transport that records every call and fails for one contact.
#[derive(Default)]
pub struct RecordingTransport {
    pub texts: Vec<(ContactId, String)>,
    sent: Vec<Sent>,
    fail_for: Option<ContactId>,
}

impl RecordingTransport {
    pub fn failing_for(contact: &str) -> Self {
        Self {
            fail_for: Some(ContactId(contact.to_string())),
            ..Self::default()
        }
    }

    pub fn kinds(&self) -> Vec<Sent> {
        self.sent.clone()
    }

    fn check(&self, recipient: &ContactId) -> Result<(), TransportError> {
        if self.fail_for.as_ref() == Some(recipient) {
            return Err(TransportError::Request("connection reset".into()));
        }
        Ok(())
    }
}

impl Transport for RecordingTransport {
    fn send_message(&mut self, recipient: &ContactId, text: &str) -> Result<(), TransportError> {
        self.check(recipient)?;
        self.sent.push(Sent::Message(recipient.clone()));
        self.texts.push((recipient.clone(), text.to_string()));
        Ok(())
    }

    fn send_photo(&mut self, recipient: &ContactId, _png: &[u8]) -> Result<(), TransportError> {
        self.check(recipient)?;
        self.sent.push(Sent::Photo(recipient.clone()));
        Ok(())
    }
}
