//! Provider adapter trait
//!
//! Everything provider-specific about a call webhook lives behind this
//! trait; decoding, audit logging, normalization and persistence are shared.

use crate::attribution::SourceMap;
use crate::error::IntakeError;
use crate::models::call_log::{CallHistory, CallLogRecord};
use crate::normalization::normalize_phone;
use crate::payload::Payload;
use crate::providers::ProviderKind;

/// Fields pulled out of one webhook, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallEvent {
    pub caller_name: String,
    pub from_raw: String,
    pub to_raw: String,
    /// CallRail `resource_id` or Twilio `CallSid`.
    pub external_id: String,
    /// Repetition metadata reported by the provider, when it sends any.
    pub reported_history: Option<CallHistory>,
}

impl CallEvent {
    pub fn from_number(&self) -> String {
        normalize_phone(&self.from_raw)
    }

    pub fn to_number(&self) -> String {
        normalize_phone(&self.to_raw)
    }
}

/// Where `first_call` / `prior_calls` come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    /// Taken as reported in the webhook payload.
    Payload,
    /// Counted from existing `call_logs` rows for the caller.
    CallLog,
}

pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn history_source(&self) -> HistorySource;

    /// The adapter's tracking-number table.
    fn source_map(&self) -> &SourceMap;

    /// Pull the provider's fields out of a decoded payload.
    fn extract_fields(&self, payload: &Payload) -> Result<CallEvent, IntakeError>;

    /// Marketing source for a normalized "number called".
    fn classify_source(&self, to_number: &str) -> String {
        self.source_map().classify(to_number)
    }

    /// Build the row to persist from an event and its call history.
    fn build_record(&self, event: &CallEvent, history: CallHistory) -> CallLogRecord;
}
