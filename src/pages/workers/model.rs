use rust_decimal::Decimal;

use super::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssignedProject {
    pub(super) site_id: Uuid,
    /// Overrides the worker's base salary on this site
    #[serde(default)]
    pub(super) project_salary: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WorkerPayload {
    pub(super) name: String,
    pub(super) role: String,
    #[serde(default)]
    pub(super) base_salary: Option<Decimal>,
    #[serde(default)]
    pub(super) rfid_id: Option<String>,
    #[serde(default)]
    pub(super) assigned_projects: Vec<AssignedProject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WorkerDetails {
    #[serde(flatten)]
    pub(super) worker: worker::Model,
    pub(super) assigned_projects: Vec<AssignedProject>,
}
