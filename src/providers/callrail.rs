//! CallRail adapter
//!
//! CallRail posts JSON and reports `first_call` / `prior_calls` itself.
//! Every field is optional; absent values fall back to empty defaults.

use crate::attribution::SourceMap;
use crate::error::IntakeError;
use crate::models::call_log::{CallHistory, CallLogRecord};
use crate::payload::Payload;
use crate::providers::{CallEvent, HistorySource, ProviderAdapter, ProviderKind};

const CUSTOMER_NAME: &str = "customer_name";
const CUSTOMER_PHONE_NUMBER: &str = "customer_phone_number";
const TRACKING_PHONE_NUMBER: &str = "tracking_phone_number";
const RESOURCE_ID: &str = "resource_id";
const FIRST_CALL: &str = "first_call";
const PRIOR_CALLS: &str = "prior_calls";

#[derive(Debug, Clone)]
pub struct CallRailAdapter {
    sources: SourceMap,
}

impl CallRailAdapter {
    pub fn new(sources: SourceMap) -> Self {
        Self { sources }
    }
}

impl ProviderAdapter for CallRailAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CallRail
    }

    fn history_source(&self) -> HistorySource {
        HistorySource::Payload
    }

    fn source_map(&self) -> &SourceMap {
        &self.sources
    }

    fn extract_fields(&self, payload: &Payload) -> Result<CallEvent, IntakeError> {
        Ok(CallEvent {
            caller_name: payload.string(CUSTOMER_NAME),
            from_raw: payload.string(CUSTOMER_PHONE_NUMBER),
            to_raw: payload.string(TRACKING_PHONE_NUMBER),
            external_id: payload.string(RESOURCE_ID),
            reported_history: Some(CallHistory {
                first_call: payload.flag(FIRST_CALL),
                prior_calls: payload.integer(PRIOR_CALLS),
            }),
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
            sid: None,
            resource_id: Some(event.external_id.clone()),
        }
    }
}
