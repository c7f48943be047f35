//! Call log entity model
//!
//! This module contains the SeaORM entity model for the `call_logs` table,
//! one row per accepted inbound-call webhook.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use crate::providers::ProviderKind;

/// A persisted call
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "call_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Slug of the provider that delivered the webhook
    pub provider: String,

    /// Normalized number that was dialed
    pub to_number: String,

    /// Normalized caller number
    pub from_number: String,

    /// Caller name as reported by the provider, possibly empty
    pub name: String,

    /// Marketing source label, or "Unknown"
    pub source: String,

    /// 1 when this was the caller's first call, otherwise 0
    pub first_call: i32,

    pub prior_calls: i32,

    /// Twilio call identifier
    pub sid: Option<String>,

    /// CallRail call identifier
    pub resource_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Whether a call is the caller's first, and how many came before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallHistory {
    pub first_call: bool,
    pub prior_calls: i64,
}

impl CallHistory {
    /// History derived from the number of previously stored calls.
    pub fn from_prior_count(count: u64) -> Self {
        Self {
            first_call: count == 0,
            prior_calls: i64::try_from(count).unwrap_or(i64::MAX),
        }
    }
}

/// A normalized call ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLogRecord {
    pub provider: ProviderKind,
    pub to_number: String,
    pub from_number: String,
    pub name: String,
    pub source: String,
    pub history: CallHistory,
    pub sid: Option<String>,
    pub resource_id: Option<String>,
}

impl CallLogRecord {
    /// Active model for a fresh row with a new id and the current timestamp.
    pub fn into_active_model(self) -> ActiveModel {
        let prior_calls = i32::try_from(self.history.prior_calls.max(0)).unwrap_or(i32::MAX);
        ActiveModel {
            id: Set(Uuid::new_v4()),
            provider: Set(self.provider.slug().to_string()),
            to_number: Set(self.to_number),
            from_number: Set(self.from_number),
            name: Set(self.name),
            source: Set(self.source),
            first_call: Set(i32::from(self.history.first_call)),
            prior_calls: Set(prior_calls),
            sid: Set(self.sid),
            resource_id: Set(self.resource_id),
            created_at: Set(Utc::now().into()),
        }
    }
}
