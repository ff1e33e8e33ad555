use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use sea_orm::{ActiveValue::{NotSet, Set, Unchanged}, DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{entity::{activity_log, prelude::*, user}, error::ApiError};

use super::{access::{ensure_site_access, SiteScope}, query::EntryFilter};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_activities)
        .service(log_activity)
        .service(update_activity)
        .service(delete_activity);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityPayload {
    site_id: Uuid,
    message: String,
    date: NaiveDate,
}

impl ActivityPayload {
    fn message(&self) -> Result<String, ApiError> {
        match self.message.trim() {
            "" => Err(ApiError::BadRequest("message is required".to_string())),
            message => Ok(message.to_string()),
        }
    }
}

async fn find_activity(db: &DatabaseConnection, user: &user::Model, id: Uuid) -> Result<activity_log::Model, ApiError> {
    let activity = ActivityLog::find_by_id(id)
        .one(db).await?
        .ok_or(ApiError::NotFound("activity log"))?;

    ensure_site_access(db, user, activity.site_id).await?;

    Ok(activity)
}

#[get("")]
async fn list_activities(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<EntryFilter>) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, filter.site_id).await?;

    let query = scope.apply(ActivityLog::find(), activity_log::Column::SiteId);
    let query = filter.apply_dates(query, activity_log::Column::Date);

    let activities = query
        .order_by_desc(activity_log::Column::Date)
        .all(db.get_ref()).await?;

    Ok(web::Json(activities))
}

#[post("/log")]
async fn log_activity(db: web::Data<DatabaseConnection>, user: user::Model, payload: web::Json<ActivityPayload>) -> Result<impl Responder, ApiError> {
    let message = payload.message()?;
    ensure_site_access(db.get_ref(), &user, payload.site_id).await?;

    let activity = ActivityLog::insert(activity_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        created_by: Set(Some(user.id)),
        updated_by: Set(Some(user.id)),
        site_id: Set(payload.site_id),
        message: Set(message),
        date: Set(payload.date),
    }).exec_with_returning(db.get_ref()).await?;

    info!(activity_log_id = %activity.id, site_id = %activity.site_id, "activity logged");

    Ok(HttpResponse::Created().json(activity))
}

#[put("/{id}")]
async fn update_activity(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>, payload: web::Json<ActivityPayload>) -> Result<impl Responder, ApiError> {
    let message = payload.message()?;

    let existing = find_activity(db.get_ref(), &user, *id).await?;
    if payload.site_id != existing.site_id {
        ensure_site_access(db.get_ref(), &user, payload.site_id).await?;
    }

    let activity = ActivityLog::update(activity_log::ActiveModel {
        id: Unchanged(existing.id),
        created_at: NotSet,
        updated_at: Set(Local::now().fixed_offset()),
        created_by: NotSet,
        updated_by: Set(Some(user.id)),
        site_id: Set(payload.site_id),
        message: Set(message),
        date: Set(payload.date),
    }).exec(db.get_ref()).await?;

    Ok(web::Json(activity))
}

#[delete("/{id}")]
async fn delete_activity(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let activity = find_activity(db.get_ref(), &user, *id).await?;

    ActivityLog::delete_by_id(activity.id).exec(db.get_ref()).await?;

    info!(activity_log_id = %activity.id, by = %user.id, "activity log deleted");

    Ok(HttpResponse::NoContent().finish())
}
