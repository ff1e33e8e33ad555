use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{sea_query::Expr, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::Admin, entity::{prelude::*, role, user, worker}, error::ApiError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_roles)
        .service(create_role)
        .service(update_role)
        .service(delete_role);
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RolePayload {
    role_name: String,
    default_salary: Decimal,
}

impl RolePayload {
    fn validated(&self) -> Result<(String, Decimal), ApiError> {
        let role_name = self.role_name.trim();
        if role_name.is_empty() {
            return Err(ApiError::BadRequest("roleName is required".to_string()));
        }
        if self.default_salary < Decimal::ZERO {
            return Err(ApiError::BadRequest("defaultSalary cannot be negative".to_string()));
        }

        Ok((role_name.to_string(), self.default_salary))
    }
}

#[get("")]
async fn list_roles(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<impl Responder, ApiError> {
    let roles = Role::find()
        .order_by_asc(role::Column::RoleName)
        .all(db.get_ref()).await?;

    Ok(web::Json(roles))
}

#[post("")]
async fn create_role(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<RolePayload>) -> Result<impl Responder, ApiError> {
    let (role_name, default_salary) = payload.validated()?;

    let taken = Role::find()
        .filter(role::Column::RoleName.eq(&role_name))
        .one(db.get_ref()).await?;
    if taken.is_some() {
        return Err(ApiError::BadRequest(format!("role `{role_name}` already exists")));
    }

    let role = Role::insert(role::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        role_name: Set(role_name),
        default_salary: Set(default_salary),
    }).exec_with_returning(db.get_ref()).await?;

    info!(role_id = %role.id, by = %admin.id, "role created");

    Ok(HttpResponse::Created().json(role))
}

/// Workers refer to their role by name, so a rename is carried over to them
#[put("/{id}")]
async fn update_role(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>, payload: web::Json<RolePayload>) -> Result<impl Responder, ApiError> {
    let (role_name, default_salary) = payload.validated()?;

    let existing = Role::find_by_id(*id)
        .one(db.get_ref()).await?
        .ok_or(ApiError::NotFound("role"))?;

    if role_name != existing.role_name {
        let taken = Role::find()
            .filter(role::Column::RoleName.eq(&role_name))
            .one(db.get_ref()).await?;
        if taken.is_some() {
            return Err(ApiError::BadRequest(format!("role `{role_name}` already exists")));
        }
    }

    let txn = db.begin().await?;

    if role_name != existing.role_name {
        Worker::update_many()
            .col_expr(worker::Column::Role, Expr::value(role_name.clone()))
            .filter(worker::Column::Role.eq(&existing.role_name))
            .exec(&txn).await?;
    }

    let role = Role::update(role::ActiveModel {
        id: Unchanged(existing.id),
        updated_at: Set(Local::now().fixed_offset()),
        role_name: Set(role_name),
        default_salary: Set(default_salary),
        ..Default::default()
    }).exec(&txn).await?;

    txn.commit().await?;

    info!(role_id = %role.id, by = %admin.id, "role updated");

    Ok(web::Json(role))
}

#[delete("/{id}")]
async fn delete_role(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let result = Role::delete_by_id(*id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("role"));
    }

    info!(role_id = %id, by = %admin.id, "role deleted");

    Ok(HttpResponse::NoContent().finish())
}
