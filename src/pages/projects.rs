use std::collections::{BTreeSet, HashMap};

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::Admin, entity::{prelude::*, project, project_supervisor, sea_orm_active_enums::RoleType, user, worker, worker_assignment}, error::ApiError};

use super::access::SiteScope;

use extractor::SupervisedProject;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_projects)
        .service(get_project)
        .service(create_project)
        .service(update_project)
        .service(delete_project);
}

pub(super) async fn load_members<C: ConnectionTrait>(db: &C, project_ids: &[Uuid]) -> Result<Members, ApiError> {
    let mut members = Members::default();
    if project_ids.is_empty() {
        return Ok(members);
    }

    for ps in ProjectSupervisor::find()
        .filter(project_supervisor::Column::ProjectId.is_in(project_ids.iter().copied()))
        .all(db).await?
    {
        members.supervisors.entry(ps.project_id).or_default().push(ps.user_id);
    }

    for wa in WorkerAssignment::find()
        .filter(worker_assignment::Column::ProjectId.is_in(project_ids.iter().copied()))
        .all(db).await?
    {
        members.workers.entry(wa.project_id).or_default().push(AssignedWorker {
            worker_id: wa.worker_id,
            salary_override: wa.salary_override,
        });
    }

    Ok(members)
}

/// A project's form owns the project's side of both junction tables
async fn validate<C: ConnectionTrait>(db: &C, payload: &ProjectPayload) -> Result<(BTreeSet<Uuid>, Vec<AssignedWorker>), ApiError> {
    for (field, value) in [("name", &payload.name), ("type", &payload.site_type), ("location", &payload.location)] {
        if value.trim().is_empty() {
            return Err(ApiError::BadRequest(format!("{field} is required")));
        }
    }

    if payload.assigned_workers.iter().filter_map(|aw| aw.salary_override).any(|s| s < Decimal::ZERO) {
        return Err(ApiError::BadRequest("salaryOverride cannot be negative".to_string()));
    }

    let workers = payload.assigned_workers.iter().map(|aw| aw.worker_id).collect::<BTreeSet<_>>();
    if workers.len() != payload.assigned_workers.len() {
        return Err(ApiError::BadRequest("a worker can only be assigned once".to_string()));
    }

    let supervisors = payload.supervisors.iter().copied().collect::<BTreeSet<_>>();
    if !supervisors.is_empty() {
        let found = User::find()
            .filter(user::Column::Id.is_in(supervisors.iter().copied()))
            .filter(user::Column::Role.eq(RoleType::Supervisor))
            .all(db).await?;

        if found.len() != supervisors.len() {
            return Err(ApiError::BadRequest("every supervisor must be an existing supervisor account".to_string()));
        }
    }

    if !workers.is_empty() {
        let found = Worker::find()
            .filter(worker::Column::Id.is_in(workers.iter().copied()))
            .all(db).await?;

        if found.len() != workers.len() {
            return Err(ApiError::BadRequest("every assigned worker must exist".to_string()));
        }
    }

    Ok((supervisors, payload.assigned_workers.clone()))
}

async fn insert_members<C: ConnectionTrait>(db: &C, project_id: Uuid, supervisors: &BTreeSet<Uuid>, workers: &[AssignedWorker]) -> Result<(), ApiError> {
    if !supervisors.is_empty() {
        ProjectSupervisor::insert_many(supervisors.iter().map(|&user_id| project_supervisor::ActiveModel {
            project_id: Set(project_id),
            user_id: Set(user_id),
        })).exec_without_returning(db).await?;
    }

    if !workers.is_empty() {
        WorkerAssignment::insert_many(workers.iter().map(|aw| worker_assignment::ActiveModel {
            worker_id: Set(aw.worker_id),
            project_id: Set(project_id),
            salary_override: Set(aw.salary_override),
        })).exec_without_returning(db).await?;
    }

    Ok(())
}

#[get("")]
async fn list_projects(db: web::Data<DatabaseConnection>, user: user::Model) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, None).await?;

    let projects = scope.apply(Project::find(), project::Column::Id)
        .order_by_asc(project::Column::Name)
        .all(db.get_ref()).await?;

    let ids = projects.iter().map(|p| p.id).collect::<Vec<_>>();
    let mut members = load_members(db.get_ref(), &ids).await?;

    Ok(web::Json(
        projects.into_iter()
            .map(|project| ProjectDetails::new(project, &mut members))
            .collect::<Vec<_>>()
    ))
}

#[get("/{project_id}")]
async fn get_project(db: web::Data<DatabaseConnection>, project: SupervisedProject) -> Result<impl Responder, ApiError> {
    let mut members = load_members(db.get_ref(), &[project.id]).await?;

    Ok(web::Json(ProjectDetails::new(project.0, &mut members)))
}

#[post("")]
async fn create_project(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<ProjectPayload>) -> Result<impl Responder, ApiError> {
    let (supervisors, workers) = validate(db.get_ref(), &payload).await?;

    let txn = db.begin().await?;

    let project = Project::insert(project::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        created_by: Set(Some(admin.id)),
        updated_by: Set(Some(admin.id)),
        name: Set(payload.name.trim().to_string()),
        site_type: Set(payload.site_type.trim().to_string()),
        location: Set(payload.location.trim().to_string()),
        start_date: Set(payload.start_date),
    }).exec_with_returning(&txn).await?;

    insert_members(&txn, project.id, &supervisors, &workers).await?;

    txn.commit().await?;

    info!(project_id = %project.id, by = %admin.id, "project created");

    Ok(HttpResponse::Created().json(ProjectDetails {
        project,
        supervisors: supervisors.into_iter().collect(),
        assigned_workers: workers,
    }))
}

#[put("/{project_id}")]
async fn update_project(db: web::Data<DatabaseConnection>, admin: Admin, existing: project::Model, payload: web::Json<ProjectPayload>) -> Result<impl Responder, ApiError> {
    let (supervisors, workers) = validate(db.get_ref(), &payload).await?;

    let txn = db.begin().await?;

    let project = Project::update(project::ActiveModel {
        id: Unchanged(existing.id),
        created_at: NotSet,
        updated_at: Set(Local::now().fixed_offset()),
        created_by: NotSet,
        updated_by: Set(Some(admin.id)),
        name: Set(payload.name.trim().to_string()),
        site_type: Set(payload.site_type.trim().to_string()),
        location: Set(payload.location.trim().to_string()),
        start_date: Set(payload.start_date),
    }).exec(&txn).await?;

    ProjectSupervisor::delete_many()
        .filter(project_supervisor::Column::ProjectId.eq(project.id))
        .exec(&txn).await?;
    WorkerAssignment::delete_many()
        .filter(worker_assignment::Column::ProjectId.eq(project.id))
        .exec(&txn).await?;

    insert_members(&txn, project.id, &supervisors, &workers).await?;

    txn.commit().await?;

    info!(project_id = %project.id, by = %admin.id, "project updated");

    Ok(web::Json(ProjectDetails {
        project,
        supervisors: supervisors.into_iter().collect(),
        assigned_workers: workers,
    }))
}

/// Attendance, advances, material and activity logs and salary logs of the project go with it
#[delete("/{project_id}")]
async fn delete_project(db: web::Data<DatabaseConnection>, admin: Admin, project: project::Model) -> Result<impl Responder, ApiError> {
    Project::delete_by_id(project.id).exec(db.get_ref()).await?;

    info!(project_id = %project.id, by = %admin.id, "project deleted");

    Ok(HttpResponse::NoContent().finish())
}
