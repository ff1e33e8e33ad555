//! `SeaORM` entities

pub mod prelude;

pub mod activity_log;
pub mod advance;
pub mod attendance;
pub mod material_log;
pub mod project;
pub mod project_supervisor;
pub mod role;
pub mod salary_log;
pub mod sea_orm_active_enums;
pub mod user;
pub mod worker;
pub mod worker_assignment;
