use actix_web::web;

use crate::error::ApiError;

mod access;
mod query;

mod activities;
mod advances;
mod attendance;
mod auth;
mod dashboard;
mod materials;
mod projects;
mod reports;
mod roles;
mod supervisor;
mod workers;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/roles")
            .configure(roles::config))
        .service(web::scope("/workers")
            .configure(workers::config))
        .service(web::scope("/projects")
            .configure(projects::config))
        .service(web::scope("/admin")
            .configure(dashboard::admin_config))
        .service(web::scope("/supervisor")
            .configure(supervisor::config)
            .configure(dashboard::supervisor_config))
        .service(web::scope("/attendance")
            .configure(attendance::config))
        .service(web::scope("/advances")
            .configure(advances::config))
        .service(web::scope("/materials")
            .configure(materials::config))
        .service(web::scope("/activities")
            .configure(activities::config))
        .service(web::scope("/reports")
            .configure(reports::config));
}

/// Malformed bodies answer with the same `{ "message": ... }` shape as every other error
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into())
}
