use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
}

/// Labels are the ones shown to supervisors when marking attendance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "shift_type")]
pub enum ShiftType {
    #[sea_orm(string_value = "full_day")]
    #[serde(rename = "Full Day")]
    FullDay,
    #[sea_orm(string_value = "one_and_a_half_day")]
    #[serde(rename = "One-and-a-Half Day")]
    OneAndAHalfDay,
    #[sea_orm(string_value = "half_day_morning")]
    #[serde(rename = "Half Day Morning")]
    HalfDayMorning,
    #[sea_orm(string_value = "half_day_evening")]
    #[serde(rename = "Half Day Evening")]
    HalfDayEvening,
}
