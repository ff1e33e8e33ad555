use std::collections::BTreeSet;

use chrono::Local;
use futures_util::future::join_all;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity::{prelude::*, salary_log, user};

use super::PayrollError;

/// Marks one salary log paid or unpaid.
///
/// Only a real transition touches the row, so marking an already paid log
/// again keeps its original `payment_date`. Unpaying clears it. The log is
/// returned in its current state either way.
pub async fn set_paid<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    id: Uuid,
    paid: bool,
) -> Result<salary_log::Model, PayrollError> {
    let now = Local::now().fixed_offset();

    let result = SalaryLog::update_many()
        .col_expr(salary_log::Column::Paid, Expr::value(paid))
        .col_expr(salary_log::Column::PaymentDate, Expr::value(paid.then_some(now)))
        .col_expr(salary_log::Column::UpdatedAt, Expr::value(now))
        .col_expr(salary_log::Column::UpdatedBy, Expr::value(Some(actor.id)))
        .filter(salary_log::Column::Id.eq(id))
        .filter(salary_log::Column::Paid.eq(!paid))
        .exec(db).await?;

    let log = SalaryLog::find_by_id(id)
        .one(db).await?
        .ok_or(PayrollError::SalaryLogNotFound(id))?;

    if result.rows_affected > 0 {
        info!(salary_log_id = %id, paid, by = %actor.id, "salary log payment status changed");
    }

    Ok(log)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPaidFailure {
    pub id: Uuid,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPaidOutcome {
    pub succeeded: Vec<salary_log::Model>,
    pub failed: Vec<BulkPaidFailure>,
}

/// Applies [`set_paid`] to every distinct id; one bad id never blocks the others
pub async fn set_paid_bulk<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    ids: &[Uuid],
    paid: bool,
) -> BulkPaidOutcome {
    let ids = ids.iter().copied().collect::<BTreeSet<_>>();

    let results = join_all(ids.iter().map(|&id| async move {
        (id, set_paid(db, actor, id, paid).await)
    })).await;

    let mut outcome = BulkPaidOutcome::default();

    for (id, result) in results {
        match result {
            Ok(log) => outcome.succeeded.push(log),
            Err(err) => {
                warn!(salary_log_id = %id, error = %err, "unable to change payment status");
                outcome.failed.push(BulkPaidFailure { id, message: err.to_string() });
            }
        }
    }

    outcome
}
