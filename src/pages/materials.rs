use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{NotSet, Set, Unchanged}, DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{entity::{material_log, prelude::*, user}, error::ApiError, payroll::{fits_money_column, round_money, PayrollError}};

use super::{access::{ensure_site_access, SiteScope}, query::EntryFilter};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_materials)
        .service(create_material)
        .service(update_material)
        .service(delete_material);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialPayload {
    site_id: Uuid,
    material: String,
    #[serde(default)]
    brand: Option<String>,
    quantity: Decimal,
    unit: String,
    price_per_unit: Decimal,
    date: NaiveDate,
}

impl MaterialPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.material.trim().is_empty() || self.unit.trim().is_empty() {
            return Err(ApiError::BadRequest("material and unit are required".to_string()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(PayrollError::InvalidAmount.into());
        }
        if self.price_per_unit < Decimal::ZERO {
            return Err(ApiError::BadRequest("pricePerUnit cannot be negative".to_string()));
        }
        if !fits_money_column(self.price_per_unit) {
            return Err(ApiError::BadRequest("pricePerUnit must be a cent amount below 10000000000".to_string()));
        }

        Ok(())
    }

    fn total_cost(&self) -> Decimal {
        round_money(self.quantity * self.price_per_unit)
    }

    fn brand(&self) -> Option<String> {
        self.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()).map(str::to_string)
    }
}

async fn find_material(db: &DatabaseConnection, user: &user::Model, id: Uuid) -> Result<material_log::Model, ApiError> {
    let material = MaterialLog::find_by_id(id)
        .one(db).await?
        .ok_or(ApiError::NotFound("material log"))?;

    ensure_site_access(db, user, material.site_id).await?;

    Ok(material)
}

#[get("")]
async fn list_materials(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<EntryFilter>) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, filter.site_id).await?;

    let query = scope.apply(MaterialLog::find(), material_log::Column::SiteId);
    let query = filter.apply_dates(query, material_log::Column::Date);

    let materials = query
        .order_by_desc(material_log::Column::Date)
        .all(db.get_ref()).await?;

    Ok(web::Json(materials))
}

#[post("")]
async fn create_material(db: web::Data<DatabaseConnection>, user: user::Model, payload: web::Json<MaterialPayload>) -> Result<impl Responder, ApiError> {
    payload.validate()?;
    ensure_site_access(db.get_ref(), &user, payload.site_id).await?;

    let material = MaterialLog::insert(material_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        created_by: Set(Some(user.id)),
        updated_by: Set(Some(user.id)),
        site_id: Set(payload.site_id),
        material: Set(payload.material.trim().to_string()),
        brand: Set(payload.brand()),
        quantity: Set(payload.quantity),
        unit: Set(payload.unit.trim().to_string()),
        price_per_unit: Set(payload.price_per_unit),
        total_cost: Set(payload.total_cost()),
        date: Set(payload.date),
    }).exec_with_returning(db.get_ref()).await?;

    info!(material_log_id = %material.id, site_id = %material.site_id, total_cost = %material.total_cost, "material logged");

    Ok(HttpResponse::Created().json(material))
}

#[put("/{id}")]
async fn update_material(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>, payload: web::Json<MaterialPayload>) -> Result<impl Responder, ApiError> {
    payload.validate()?;

    let existing = find_material(db.get_ref(), &user, *id).await?;
    if payload.site_id != existing.site_id {
        ensure_site_access(db.get_ref(), &user, payload.site_id).await?;
    }

    let material = MaterialLog::update(material_log::ActiveModel {
        id: Unchanged(existing.id),
        created_at: NotSet,
        updated_at: Set(Local::now().fixed_offset()),
        created_by: NotSet,
        updated_by: Set(Some(user.id)),
        site_id: Set(payload.site_id),
        material: Set(payload.material.trim().to_string()),
        brand: Set(payload.brand()),
        quantity: Set(payload.quantity),
        unit: Set(payload.unit.trim().to_string()),
        price_per_unit: Set(payload.price_per_unit),
        total_cost: Set(payload.total_cost()),
        date: Set(payload.date),
    }).exec(db.get_ref()).await?;

    Ok(web::Json(material))
}

#[delete("/{id}")]
async fn delete_material(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let material = find_material(db.get_ref(), &user, *id).await?;

    MaterialLog::delete_by_id(material.id).exec(db.get_ref()).await?;

    info!(material_log_id = %material.id, by = %user.id, "material log deleted");

    Ok(HttpResponse::NoContent().finish())
}
