use actix_web::{get, web, Responder};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::{entity::{prelude::*, project, user}, error::ApiError};

use super::access::SiteScope;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(my_sites);
}

/// Supervisors get the sites they are assigned to, admins get every site
#[get("/my-sites")]
async fn my_sites(db: web::Data<DatabaseConnection>, user: user::Model) -> Result<impl Responder, ApiError> {
    let scope = SiteScope::resolve(db.get_ref(), &user, None).await?;

    let sites = scope.apply(Project::find(), project::Column::Id)
        .order_by_asc(project::Column::Name)
        .all(db.get_ref()).await?;

    Ok(web::Json(sites))
}
