use chrono::NaiveDate;
use sea_orm::{ColumnTrait, QueryFilter};
use serde::Deserialize;
use uuid::Uuid;

use crate::utils::empty_string_as_none;

/// `?siteId=&workerId=&startDate=&endDate=` shared by the log listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EntryFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(super) site_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(super) worker_id: Option<Uuid>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(super) start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(super) end_date: Option<NaiveDate>,
}

impl EntryFilter {
    pub(super) fn apply_dates<Q: QueryFilter>(&self, mut query: Q, date: impl ColumnTrait) -> Q {
        if let Some(start) = self.start_date {
            query = query.filter(date.gte(start));
        }
        if let Some(end) = self.end_date {
            query = query.filter(date.lte(end));
        }

        query
    }

    pub(super) fn apply_worker<Q: QueryFilter>(&self, query: Q, worker: impl ColumnTrait) -> Q {
        match self.worker_id {
            Some(worker_id) => query.filter(worker.eq(worker_id)),
            None => query,
        }
    }
}
