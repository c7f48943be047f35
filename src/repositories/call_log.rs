//! # Call Log Repository
//!
//! Encapsulates SeaORM access to the `call_logs` table: the prior-call count
//! used for Twilio attribution and the single-row insert shared by every
//! provider.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::models::call_log::{self, CallHistory, CallLogRecord, Entity as CallLog, Model};

/// Repository for call log database operations
#[derive(Debug, Clone, Copy)]
pub struct CallLogRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CallLogRepository<'a> {
    /// Create a new CallLogRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Number of stored calls whose `from_number` equals `from_number` exactly.
    pub async fn count_prior_calls(&self, from_number: &str) -> Result<u64, DbErr> {
        count_by_from_number(self.db, from_number).await
    }

    /// Insert one row and return it.
    pub async fn insert(&self, record: CallLogRecord) -> Result<Model, DbErr> {
        record.into_active_model().insert(self.db).await
    }

    /// Count prior calls from `from_number` and insert the record built from
    /// that count, inside one transaction.
    ///
    /// This narrows but does not close the window where two concurrent calls
    /// from the same number both observe the same count.
    pub async fn insert_counting_prior<F>(&self, from_number: &str, build: F) -> Result<Model, DbErr>
    where
        F: FnOnce(CallHistory) -> CallLogRecord,
    {
        let txn = self.db.begin().await?;
        let count = count_by_from_number(&txn, from_number).await?;
        let record = build(CallHistory::from_prior_count(count));
        let model = record.into_active_model().insert(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }

    /// Rows for a caller, oldest first.
    pub async fn find_by_from_number(&self, from_number: &str) -> Result<Vec<Model>, DbErr> {
        CallLog::find()
            .filter(call_log::Column::FromNumber.eq(from_number))
            .order_by_asc(call_log::Column::CreatedAt)
            .order_by_asc(call_log::Column::PriorCalls)
            .all(self.db)
            .await
    }

    /// Most recent rows across all providers.
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<Model>, DbErr> {
        CallLog::find()
            .order_by_desc(call_log::Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await
    }

    /// Total number of stored rows.
    pub async fn count_all(&self) -> Result<u64, DbErr> {
        CallLog::find().count(self.db).await
    }
}

async fn count_by_from_number<C>(conn: &C, from_number: &str) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    CallLog::find()
        .filter(call_log::Column::FromNumber.eq(from_number))
        .count(conn)
        .await
}
