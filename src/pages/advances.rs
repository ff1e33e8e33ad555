use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use tracing::info;
use uuid::Uuid;

use crate::{entity::{advance, prelude::*, user}, error::ApiError, payroll::{self, NewAdvance}};

use super::{access::{ensure_site_access, SiteScope}, query::EntryFilter};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_advances)
        .service(log_advance)
        .service(update_advance)
        .service(delete_advance);
}

async fn find_advance(db: &DatabaseConnection, user: &user::Model, id: Uuid) -> Result<advance::Model, ApiError> {
    let advance = Advance::find_by_id(id)
        .one(db).await?
        .ok_or(ApiError::NotFound("advance"))?;

    ensure_site_access(db, user, advance.site_id).await?;

    Ok(advance)
}

#[get("")]
async fn list_advances(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<EntryFilter>) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, filter.site_id).await?;

    let query = scope.apply(Advance::find(), advance::Column::SiteId);
    let query = filter.apply_worker(query, advance::Column::WorkerId);
    let query = filter.apply_dates(query, advance::Column::Date);

    let advances = query
        .order_by_desc(advance::Column::Date)
        .all(db.get_ref()).await?;

    Ok(web::Json(advances))
}

#[post("/log")]
async fn log_advance(db: web::Data<DatabaseConnection>, user: user::Model, payload: web::Json<NewAdvance>) -> Result<impl Responder, ApiError> {
    ensure_site_access(db.get_ref(), &user, payload.site_id).await?;

    let advance = payroll::record_advance(db.get_ref(), &user, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(advance))
}

/// Moving an advance to another site needs access to both sites
#[put("/{id}")]
async fn update_advance(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>, payload: web::Json<NewAdvance>) -> Result<impl Responder, ApiError> {
    let existing = find_advance(db.get_ref(), &user, *id).await?;

    if payload.site_id != existing.site_id {
        ensure_site_access(db.get_ref(), &user, payload.site_id).await?;
    }

    let advance = payroll::revise_advance(db.get_ref(), &user, &existing, payload.into_inner()).await?;

    Ok(web::Json(advance))
}

#[delete("/{id}")]
async fn delete_advance(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let advance = find_advance(db.get_ref(), &user, *id).await?;

    Advance::delete_by_id(advance.id).exec(db.get_ref()).await?;

    info!(advance_id = %advance.id, by = %user.id, "advance deleted");

    Ok(HttpResponse::NoContent().finish())
}
