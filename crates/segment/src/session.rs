//! State of one composition session.
//!
//! The session owns the draft name, the selected fields and the in-flight
//! flag. It is created when the panel opens and reset when the panel closes
//! or a submission succeeds. At most one submission can be pending per draft.
//!
//! Every reset starts a new draft generation. A submission remembers the
//! generation it was started from, so an outcome arriving after the user
//! moved on to another draft does not touch that draft.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::gateway::{SegmentGateway, ServerResponse};
use crate::payload::{self, SegmentPayload};
use crate::selection::SelectionList;

#[derive(Debug, Clone, Default)]
pub struct DraftSession {
    name: String,
    selection: SelectionList,
    submitting: bool,
    generation: u64,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn selection(&self) -> &SelectionList {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionList {
        &mut self.selection
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Identifies the current draft. Changes on every [`reset`](Self::reset).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the save control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.name.trim().is_empty() && !self.selection.is_empty()
    }

    /// Validate the draft and mark it as in flight.
    ///
    /// Validation errors leave the session idle so the user can fix the
    /// draft; no payload is produced for an invalid draft.
    pub fn begin_submit(&mut self) -> Result<SegmentPayload> {
        if self.submitting {
            return Err(Error::SubmissionInFlight);
        }
        let payload = payload::build(&self.name, &self.selection)?;
        self.submitting = true;
        debug!(segment = %payload.segment_name, "submission started");
        Ok(payload)
    }

    /// Record the outcome of a submission started from draft `generation`.
    /// A successful save discards the draft.
    ///
    /// Returns false and changes nothing when the draft has been reset since
    /// the submission started.
    pub fn finish_submit(&mut self, generation: u64, succeeded: bool) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "outcome belongs to a discarded draft"
            );
            return false;
        }
        self.submitting = false;
        if succeeded {
            self.reset();
        }
        true
    }

    /// Discard the draft and start a new one. A submission still running for
    /// the old draft no longer blocks the new one.
    pub fn reset(&mut self) {
        self.name.clear();
        self.selection.clear();
        self.submitting = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Run a full submission against `gateway`: validate, send, finalize.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<ServerResponse>
    where
        G: SegmentGateway + ?Sized,
    {
        let payload = self.begin_submit()?;
        let generation = self.generation;
        let outcome = gateway.submit(&payload).await;
        match &outcome {
            Ok(response) => info!(status = response.status, "segment saved"),
            Err(e) => warn!("segment submission failed: {e}"),
        }
        self.finish_submit(generation, outcome.is_ok());
        outcome
    }
}
