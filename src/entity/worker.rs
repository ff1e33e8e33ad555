use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "worker")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub name: String,
    /// Name of a [`super::role::Model`]
    pub role: String,
    pub base_salary: Option<Decimal>,
    pub rfid_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::worker_assignment::Entity")]
    WorkerAssignment,
}

impl Related<super::worker_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkerAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
