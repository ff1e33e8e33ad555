use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per worker, site and week; unique on `(worker_id, site_id, week_start, week_end)`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "salary_log")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub worker_id: Uuid,
    pub site_id: Uuid,
    pub week_start: Date,
    pub week_end: Date,
    pub total_attendance_days: Decimal,
    pub gross_salary: Decimal,
    pub total_advance_deducted: Decimal,
    pub net_salary: Decimal,
    pub paid: bool,
    pub payment_date: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::worker::Entity",
        from = "Column::WorkerId",
        to = "super::worker::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Worker,
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::SiteId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Worker.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
