//! Notification composition and per-recipient dispatch.

use crate::roster::Roster;
use crate::transport::Transport;
use crate::types::{Person, Verdict};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("photo encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// A composed notification, ready for dispatch.
#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
    /// Roster members to notify, in roster order.
    pub recipients: Vec<Person>,
    /// PNG-encoded frame.
    pub photo: Vec<u8>,
}

/// Outcome of dispatching one notification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients that received both text and photo.
    pub delivered: Vec<String>,
    /// Recipients for which at least one send failed.
    pub failed: Vec<String>,
}

/// `"Alice is at the door."` / `"Alice and Unknown are at the door."`.
///
/// Every name is kept, duplicates included. `None` for no faces.
pub fn message_text(verdicts: &[Verdict]) -> Option<String> {
    if verdicts.is_empty() {
        return None;
    }

    let names: Vec<&str> = verdicts.iter().map(Verdict::display_name).collect();
    let verb = if names.len() == 1 { "is" } else { "are" };
    Some(format!("{} {verb} at the door.", names.join(" and ")))
}

/// Everyone on the roster who is not identified among `verdicts`.
pub fn select_recipients<'a>(verdicts: &[Verdict], roster: &'a Roster) -> Vec<&'a Person> {
    roster
        .iter()
        .filter(|person| !verdicts.iter().any(|v| v.identity() == Some(person.name.as_str())))
        .collect()
}

/// Encode an RGB frame as PNG.
pub fn encode_png(frame: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    frame.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Compose the notification for a changed verdict sequence.
///
/// Returns `Ok(None)` when there is nothing to send (no faces).
pub fn compose(
    verdicts: &[Verdict],
    roster: &Roster,
    frame: &RgbImage,
) -> Result<Option<Notification>, NotifyError> {
    let Some(text) = message_text(verdicts) else {
        return Ok(None);
    };

    let recipients = select_recipients(verdicts, roster)
        .into_iter()
        .cloned()
        .collect();
    let photo = encode_png(frame)?;

    Ok(Some(Notification {
        text,
        recipients,
        photo,
    }))
}

/// Send the text and the photo to every recipient.
///
/// A failed send is logged and the next recipient is tried; if the text fails,
/// the photo is not sent to that recipient.
pub fn dispatch<T: Transport + ?Sized>(
    notification: &Notification,
    transport: &mut T,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for person in &notification.recipients {
        if let Err(e) = transport.send_message(&person.contact_id, &notification.text) {
            tracing::warn!(recipient = %person.name, error = %e, "failed to send message");
            report.failed.push(person.name.clone());
            continue;
        }
        if let Err(e) = transport.send_photo(&person.contact_id, &notification.photo) {
            tracing::warn!(recipient = %person.name, error = %e, "failed to send photo");
            report.failed.push(person.name.clone());
            continue;
        }
        report.delivered.push(person.name.clone());
    }

    report
}
