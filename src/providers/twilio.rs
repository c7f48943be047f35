//! Twilio adapter
//!
//! Twilio posts form data. `From` and `To` are required; the call history is
//! counted from previously stored rows rather than trusted from the payload.

use crate::attribution::SourceMap;
use crate::error::IntakeError;
use crate::models::call_log::{CallHistory, CallLogRecord};
use crate::payload::{Payload, value_to_string};
use crate::providers::{CallEvent, HistorySource, ProviderAdapter, ProviderKind};

const FROM: &str = "From";
const TO: &str = "To";
const CALLER_NAME: &str = "CallerName";
const CALL_SID: &str = "CallSid";

#[derive(Debug, Clone)]
pub struct TwilioAdapter {
    sources: SourceMap,
}

impl TwilioAdapter {
    pub fn new(sources: SourceMap) -> Self {
        Self { sources }
    }

    fn required(&self, payload: &Payload, field: &'static str) -> Result<String, IntakeError> {
        payload
            .get_ignore_case(field)
            .map(value_to_string)
            .ok_or(IntakeError::MissingField {
                provider: self.kind().slug(),
                field,
            })
    }

    fn optional(payload: &Payload, field: &str) -> String {
        payload
            .get_ignore_case(field)
            .map(value_to_string)
            .unwrap_or_default()
    }
}

impl ProviderAdapter for TwilioAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Twilio
    }

    fn history_source(&self) -> HistorySource {
        HistorySource::CallLog
    }

    fn source_map(&self) -> &SourceMap {
        &self.sources
    }

    fn extract_fields(&self, payload: &Payload) -> Result<CallEvent, IntakeError> {
        Ok(CallEvent {
            from_raw: self.required(payload, FROM)?,
            to_raw: self.required(payload, TO)?,
            caller_name: Self::optional(payload, CALLER_NAME),
            external_id: Self::optional(payload, CALL_SID),
            reported_history: None,
        })
    }

    fn build_record(&self, event: &CallEvent, history: CallHistory) -> CallLogRecord {
        let to_number = event.to_number();
        let source = self.classify_source(&to_number);
        CallLogRecord {
            provider: self.kind(),
            from_number: event.from_number(),
            to_number,
            name: event.caller_name.clone(),
            source,
            history,
            sid: Some(event.external_id.clone()),
            resource_id: None,
        }
    }
}
