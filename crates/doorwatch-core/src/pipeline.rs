//! Per-frame pipeline: classify, detect change, compose, dispatch.

use crate::classifier::classify;
use crate::matcher::Matcher;
use crate::notification::{self, DeliveryReport, NotifyError};
use crate::observation::ObservationState;
use crate::roster::Roster;
use crate::transport::Transport;
use crate::types::{Embedding, Verdict};
use image::RgbImage;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Nobody in view; state untouched.
    NoFaces,
    /// Same visitors as the last notification.
    Unchanged(Vec<Verdict>),
    /// Visitors changed and a notification went out.
    Notified {
        verdicts: Vec<Verdict>,
        report: DeliveryReport,
    },
}

/// Owns the roster, the matcher and the single [`ObservationState`].
pub struct Doorbell<M: Matcher> {
    roster: Roster,
    matcher: M,
    state: ObservationState,
}

impl<M: Matcher> Doorbell<M> {
    pub fn new(roster: Roster, matcher: M) -> Self {
        Self {
            roster,
            matcher,
            state: ObservationState::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn state(&self) -> &ObservationState {
        &self.state
    }

    /// Run one frame's face encodings through the pipeline.
    ///
    /// On a photo encoding error nothing is sent and the state is not updated,
    /// so the next frame with the same visitors tries again.
    pub fn observe<T: Transport + ?Sized>(
        &mut self,
        encodings: &[Embedding],
        frame: &RgbImage,
        transport: &mut T,
    ) -> Result<Observation, NotifyError> {
        let verdicts = classify(&self.matcher, encodings, &self.roster);

        if verdicts.is_empty() {
            return Ok(Observation::NoFaces);
        }
        if !self.state.should_notify(&verdicts) {
            tracing::debug!(?verdicts, "visitors unchanged");
            return Ok(Observation::Unchanged(verdicts));
        }

        let Some(notification) = notification::compose(&verdicts, &self.roster, frame)? else {
            return Ok(Observation::NoFaces);
        };

        tracing::info!(
            text = %notification.text,
            recipients = notification.recipients.len(),
            "visitors changed, notifying"
        );
        let report = notification::dispatch(&notification, transport);
        self.state.record(&verdicts);

        if !report.failed.is_empty() {
            tracing::warn!(failed = ?report.failed, "notification not delivered to everyone");
        }

        Ok(Observation::Notified { verdicts, report })
    }
}
