//! Supervisors only ever see and touch the sites they are assigned to.

use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{entity::{prelude::*, project, project_supervisor, sea_orm_active_enums::RoleType, user}, error::ApiError, payroll::PayrollError};

pub(super) async fn ensure_site_access<C: ConnectionTrait>(db: &C, user: &user::Model, site_id: Uuid) -> Result<(), ApiError> {
    if user.role == RoleType::Admin {
        return Ok(());
    }

    ProjectSupervisor::find_by_id((site_id, user.id))
        .one(db).await?
        .map(|_| ())
        .ok_or(ApiError::Forbidden)
}

pub(super) async fn supervised_sites<C: ConnectionTrait>(db: &C, user: &user::Model) -> Result<Vec<Uuid>, ApiError> {
    let sites = ProjectSupervisor::find()
        .filter(project_supervisor::Column::UserId.eq(user.id))
        .all(db).await?
        .into_iter()
        .map(|ps| ps.project_id)
        .collect();

    Ok(sites)
}

/// Rejects ids that do not name a project, before they reach a foreign key
pub(super) async fn ensure_sites_exist<C: ConnectionTrait>(db: &C, site_ids: &BTreeSet<Uuid>) -> Result<(), ApiError> {
    if site_ids.is_empty() {
        return Ok(());
    }

    let found = Project::find()
        .filter(project::Column::Id.is_in(site_ids.iter().copied()))
        .all(db).await?
        .into_iter()
        .map(|p| p.id)
        .collect::<BTreeSet<_>>();

    match site_ids.difference(&found).next() {
        Some(missing) => Err(PayrollError::SiteNotFound(*missing).into()),
        None => Ok(()),
    }
}

/// Sites a listing may return rows for
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SiteScope {
    All,
    Only(Vec<Uuid>),
}

impl SiteScope {
    /// An explicitly requested site is checked, otherwise supervisors fall back to their own sites
    pub(super) async fn resolve<C: ConnectionTrait>(db: &C, user: &user::Model, requested: Option<Uuid>) -> Result<Self, ApiError> {
        if let Some(site_id) = requested {
            ensure_site_access(db, user, site_id).await?;
            return Ok(SiteScope::Only(vec![ site_id ]));
        }

        match user.role {
            RoleType::Admin => Ok(SiteScope::All),
            RoleType::Supervisor => Ok(SiteScope::Only(supervised_sites(db, user).await?)),
        }
    }

    pub(super) fn apply<Q: QueryFilter>(&self, query: Q, column: impl ColumnTrait) -> Q {
        match self {
            SiteScope::All => query,
            SiteScope::Only(sites) => query.filter(column.is_in(sites.iter().copied())),
        }
    }
}
