use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RoleType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique)]
    pub username: String,
    /// SHA-256 of `password:username`, never leaves the server
    #[serde(skip_serializing, default)]
    pub password: Vec<u8>,
    pub role: RoleType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_supervisor::Entity")]
    ProjectSupervisor,
}

impl Related<super::project_supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectSupervisor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
