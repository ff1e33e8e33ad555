use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{Set, Unchanged}, ConnectionTrait, EntityTrait};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entity::{advance, attendance, prelude::*, sea_orm_active_enums::ShiftType, user};

use super::{calculator::fits_money_column, PayrollError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub site_id: Uuid,
    pub worker_id: Uuid,
    pub date: NaiveDate,
    /// Kept as the raw label so an unknown shift surfaces as [`PayrollError::InvalidShiftType`]
    pub shift_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvance {
    pub site_id: Uuid,
    pub worker_id: Uuid,
    pub date: NaiveDate,
    pub amount: Decimal,
    #[serde(default)]
    pub reason: String,
}

impl NewAdvance {
    fn validate(&self) -> Result<(), PayrollError> {
        if self.amount <= Decimal::ZERO || !fits_money_column(self.amount) {
            return Err(PayrollError::InvalidAmount);
        }

        Ok(())
    }
}

async fn ensure_worker_and_site<C: ConnectionTrait>(db: &C, worker_id: Uuid, site_id: Uuid) -> Result<(), PayrollError> {
    Worker::find_by_id(worker_id)
        .one(db).await?
        .ok_or(PayrollError::WorkerNotFound(worker_id))?;

    Project::find_by_id(site_id)
        .one(db).await?
        .ok_or(PayrollError::SiteNotFound(site_id))?;

    Ok(())
}

/// Validates and stores one attendance entry with its day credit resolved
pub async fn record_attendance<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    entry: NewAttendance,
) -> Result<attendance::Model, PayrollError> {
    let shift_type = entry.shift_type.parse::<ShiftType>()?;

    ensure_worker_and_site(db, entry.worker_id, entry.site_id).await?;

    let now = Local::now().fixed_offset();
    let model = attendance::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(Some(actor.id)),
        updated_by: Set(Some(actor.id)),
        worker_id: Set(entry.worker_id),
        site_id: Set(entry.site_id),
        date: Set(entry.date),
        shift_type: Set(shift_type),
        multiplier: Set(shift_type.multiplier()),
    };

    let saved = Attendance::insert(model)
        .exec_with_returning(db).await?;

    info!(attendance_id = %saved.id, worker_id = %saved.worker_id, site_id = %saved.site_id, shift = shift_type.label(), "attendance recorded");

    Ok(saved)
}

pub async fn record_advance<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    entry: NewAdvance,
) -> Result<advance::Model, PayrollError> {
    entry.validate()?;

    ensure_worker_and_site(db, entry.worker_id, entry.site_id).await?;

    let now = Local::now().fixed_offset();
    let model = advance::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        created_by: Set(Some(actor.id)),
        updated_by: Set(Some(actor.id)),
        worker_id: Set(entry.worker_id),
        site_id: Set(entry.site_id),
        date: Set(entry.date),
        amount: Set(entry.amount),
        reason: Set(entry.reason),
    };

    let saved = Advance::insert(model)
        .exec_with_returning(db).await?;

    info!(advance_id = %saved.id, worker_id = %saved.worker_id, site_id = %saved.site_id, amount = %saved.amount, "advance recorded");

    Ok(saved)
}

/// Rewrites an existing advance under the same validation as [`record_advance`]
pub async fn revise_advance<C: ConnectionTrait>(
    db: &C,
    actor: &user::Model,
    existing: &advance::Model,
    entry: NewAdvance,
) -> Result<advance::Model, PayrollError> {
    entry.validate()?;

    ensure_worker_and_site(db, entry.worker_id, entry.site_id).await?;

    let model = advance::ActiveModel {
        id: Unchanged(existing.id),
        updated_at: Set(Local::now().fixed_offset()),
        updated_by: Set(Some(actor.id)),
        worker_id: Set(entry.worker_id),
        site_id: Set(entry.site_id),
        date: Set(entry.date),
        amount: Set(entry.amount),
        reason: Set(entry.reason),
        ..Default::default()
    };

    let saved = Advance::update(model)
        .exec(db).await?;

    info!(advance_id = %saved.id, amount = %saved.amount, "advance revised");

    Ok(saved)
}
