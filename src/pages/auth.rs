use std::collections::{BTreeSet, HashMap};

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Local;
use sea_orm::{ActiveEnum as _, ActiveValue::{Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::{Admin, AuthError, Authority}, entity::{prelude::*, project_supervisor, sea_orm_active_enums::RoleType, user}, error::ApiError, utils::{self, empty_string_as_none}};

use super::access::ensure_sites_exist;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(profile)
        .service(register)
        .service(list_users)
        .service(update_user)
        .service(delete_user);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user: user::Model,
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserDetails {
    #[serde(flatten)]
    user: user::Model,
    assigned_sites: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUser {
    username: String,
    password: String,
    role: RoleType,
    #[serde(default)]
    assigned_sites: Vec<Uuid>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUser {
    username: Option<String>,
    password: Option<String>,
    role: Option<RoleType>,
    assigned_sites: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
struct UsersQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    role: Option<String>,
}

async fn assign_sites<C: ConnectionTrait>(db: &C, user_id: Uuid, role: RoleType, sites: &BTreeSet<Uuid>) -> Result<Vec<Uuid>, ApiError> {
    if role != RoleType::Supervisor || sites.is_empty() {
        return Ok(Vec::new());
    }

    ensure_sites_exist(db, sites).await?;

    ProjectSupervisor::insert_many(sites.iter().map(|&project_id| project_supervisor::ActiveModel {
        project_id: Set(project_id),
        user_id: Set(user_id),
    })).exec_without_returning(db).await?;

    Ok(sites.iter().copied().collect())
}

/// Replaces every site assignment of `user_id`; admins never keep any
async fn replace_supervised_sites<C: ConnectionTrait>(db: &C, user_id: Uuid, role: RoleType, sites: &BTreeSet<Uuid>) -> Result<Vec<Uuid>, ApiError> {
    ProjectSupervisor::delete_many()
        .filter(project_supervisor::Column::UserId.eq(user_id))
        .exec(db).await?;

    assign_sites(db, user_id, role, sites).await
}

fn required(field: &'static str, value: &str) -> Result<String, ApiError> {
    match value.trim() {
        "" => Err(ApiError::BadRequest(format!("{field} is required"))),
        value => Ok(value.to_string()),
    }
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<impl Responder, ApiError> {
    let hashed_password = utils::hash_password(&credentials.password, &credentials.username);
    
    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&credentials.username))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await?
    else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let token = authority.issue_for(&user)?;
    info!(user_id = %user.id, "user logged in");

    Ok(web::Json(LoginResponse { user, token }))
}

#[get("/profile")]
async fn profile(user: user::Model) -> impl Responder {
    web::Json(user)
}

#[post("/register")]
async fn register(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<RegisterUser>) -> Result<impl Responder, ApiError> {
    let username = required("username", &payload.username)?;
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    let taken = User::find()
        .filter(user::Column::Username.eq(&username))
        .one(db.get_ref()).await?;
    if taken.is_some() {
        return Err(ApiError::BadRequest(format!("username `{username}` is already taken")));
    }

    let user = User::insert(user::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        password: Set(utils::hash_password(&payload.password, &username)),
        username: Set(username),
        role: Set(payload.role),
    }).exec_with_returning(db.get_ref()).await?;

    let sites = payload.assigned_sites.iter().copied().collect::<BTreeSet<_>>();
    let assigned_sites = assign_sites(db.get_ref(), user.id, user.role, &sites).await?;

    info!(user_id = %user.id, by = %admin.id, "user registered");

    Ok(HttpResponse::Created().json(UserDetails { user, assigned_sites }))
}

#[get("/users")]
async fn list_users(db: web::Data<DatabaseConnection>, _admin: Admin, query: web::Query<UsersQuery>) -> Result<impl Responder, ApiError> {
    let mut users = User::find();

    if let Some(role) = &query.role {
        let role = RoleType::try_from_value(role)
            .map_err(|_| ApiError::BadRequest(format!("unknown role `{role}`")))?;
        users = users.filter(user::Column::Role.eq(role));
    }

    let users = users
        .order_by_asc(user::Column::Username)
        .all(db.get_ref()).await?;

    let mut sites = HashMap::<Uuid, Vec<Uuid>>::new();
    if !users.is_empty() {
        for ps in ProjectSupervisor::find()
            .filter(project_supervisor::Column::UserId.is_in(users.iter().map(|u| u.id)))
            .all(db.get_ref()).await?
        {
            sites.entry(ps.user_id).or_default().push(ps.project_id);
        }
    }

    Ok(web::Json(
        users.into_iter()
            .map(|user| UserDetails { assigned_sites: sites.remove(&user.id).unwrap_or_default(), user })
            .collect::<Vec<_>>()
    ))
}

#[put("/users/{id}")]
async fn update_user(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>, payload: web::Json<UpdateUser>) -> Result<impl Responder, ApiError> {
    let existing = User::find_by_id(*id)
        .one(db.get_ref()).await?
        .ok_or(ApiError::NotFound("user"))?;

    let username = match &payload.username {
        Some(username) => required("username", username)?,
        None => existing.username.clone(),
    };
    let password = payload.password.as_deref().filter(|p| !p.is_empty());

    // The stored hash is salted with the username
    if username != existing.username && password.is_none() {
        return Err(ApiError::BadRequest("password is required when changing the username".to_string()));
    }

    if username != existing.username {
        let taken = User::find()
            .filter(user::Column::Username.eq(&username))
            .one(db.get_ref()).await?;
        if taken.is_some() {
            return Err(ApiError::BadRequest(format!("username `{username}` is already taken")));
        }
    }

    let role = payload.role.unwrap_or(existing.role);

    let user = User::update(user::ActiveModel {
        id: Unchanged(existing.id),
        updated_at: Set(Local::now().fixed_offset()),
        password: match password {
            Some(password) => Set(utils::hash_password(password, &username)),
            None => Unchanged(existing.password.clone()),
        },
        username: Set(username),
        role: Set(role),
        ..Default::default()
    }).exec(db.get_ref()).await?;

    let assigned_sites = match (&payload.assigned_sites, role) {
        (Some(sites), _) => replace_supervised_sites(db.get_ref(), user.id, role, &sites.iter().copied().collect::<BTreeSet<_>>()).await?,
        (None, RoleType::Admin) => replace_supervised_sites(db.get_ref(), user.id, role, &BTreeSet::new()).await?,
        (None, RoleType::Supervisor) => super::access::supervised_sites(db.get_ref(), &user).await?,
    };

    info!(user_id = %user.id, by = %admin.id, "user updated");

    Ok(web::Json(UserDetails { user, assigned_sites }))
}

#[delete("/users/{id}")]
async fn delete_user(db: web::Data<DatabaseConnection>, admin: Admin, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    if *id == admin.id {
        return Err(ApiError::BadRequest("you cannot delete your own account".to_string()));
    }

    let result = User::delete_by_id(*id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("user"));
    }

    info!(user_id = %id, by = %admin.id, "user deleted");

    Ok(HttpResponse::NoContent().finish())
}
