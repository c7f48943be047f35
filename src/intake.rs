//! Call intake pipeline.
//!
//! Shared by every provider route: decode the body, record it in the audit
//! log, extract and normalize the provider's fields, attribute a source,
//! work out the call history and persist one row. Any failure aborts the
//! remaining steps; nothing is persisted after an audit failure and nothing
//! at all happens for an undecodable body.

use metrics::counter;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::audit_log::AuditSink;
use crate::error::IntakeError;
use crate::models::call_log::Model;
use crate::payload;
use crate::providers::{HistorySource, ProviderAdapter};
use crate::repositories::CallLogRepository;

/// Counter of processed webhooks, labelled by provider and outcome.
pub const WEBHOOKS_TOTAL: &str = "call_intake_webhooks_total";

/// Run one webhook body through the pipeline and return the stored row.
pub async fn ingest(
    db: &DatabaseConnection,
    audit: &dyn AuditSink,
    adapter: &dyn ProviderAdapter,
    body: &[u8],
    content_type: &str,
) -> Result<Model, IntakeError> {
    let provider = adapter.kind().slug();
    let result = run_pipeline(db, audit, adapter, body, content_type).await;

    let outcome = match &result {
        Ok(_) => "stored",
        Err(err) => err.kind(),
    };
    counter!(WEBHOOKS_TOTAL, "provider" => provider, "outcome" => outcome).increment(1);

    match &result {
        Ok(row) => info!(
            provider,
            call_log_id = %row.id,
            source = %row.source,
            first_call = row.first_call,
            prior_calls = row.prior_calls,
            "Call webhook stored"
        ),
        Err(err) if err.is_client_error() => {
            warn!(provider, kind = err.kind(), error = %err, "Call webhook rejected")
        }
        Err(err) => error!(provider, kind = err.kind(), error = ?err, "Call webhook failed"),
    }

    result
}

async fn run_pipeline(
    db: &DatabaseConnection,
    audit: &dyn AuditSink,
    adapter: &dyn ProviderAdapter,
    body: &[u8],
    content_type: &str,
) -> Result<Model, IntakeError> {
    let payload = payload::decode(body, content_type)?;

    audit.append(adapter.kind(), &payload).await?;

    let event = adapter.extract_fields(&payload)?;
    let repo = CallLogRepository::new(db);

    let row = match adapter.history_source() {
        HistorySource::Payload => {
            let history = event.reported_history.unwrap_or_default();
            repo.insert(adapter.build_record(&event, history)).await?
        }
        HistorySource::CallLog => {
            let from_number = event.from_number();
            repo.insert_counting_prior(&from_number, |history| {
                adapter.build_record(&event, history)
            })
            .await?
        }
    };

    Ok(row)
}
