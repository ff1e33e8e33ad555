use std::{ops::Deref, str::FromStr};

use actix_web::{dev, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::pages::access::ensure_site_access;

use super::*;

impl FromRequest for project::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        
        Box::pin(async move {
            let Some(Ok(project_id)) = req.match_info().get("project_id").map(Uuid::from_str) else {
                return Err(ApiError::BadRequest("invalid `project_id`".to_string()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");
            
            let project = Project::find_by_id(project_id)
                .one(db.get_ref()).await
                .map_err(ApiError::from)?
                .ok_or(ApiError::NotFound("project"))?;

            Ok(project)
        })
    }
}

/// A project the caller supervises, or any project for admins
pub(super) struct SupervisedProject(pub(super) project::Model);

impl Deref for SupervisedProject {
    type Target = project::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for SupervisedProject {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();
        
        Box::pin(async move {
            let user = user::Model::from_request(&req, &mut dev::Payload::None).await?;
            let project = project::Model::from_request(&req, &mut dev::Payload::None).await?;

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");
            ensure_site_access(db.get_ref(), &user, project.id).await?;
            
            Ok(Self(project))
        })
    }
}
