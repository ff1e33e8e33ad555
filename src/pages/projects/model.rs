use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssignedWorker {
    pub(super) worker_id: Uuid,
    #[serde(default)]
    pub(super) salary_override: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectPayload {
    pub(super) name: String,
    #[serde(rename = "type")]
    pub(super) site_type: String,
    pub(super) location: String,
    pub(super) start_date: NaiveDate,
    /// User ids, all of them supervisors
    #[serde(default)]
    pub(super) supervisors: Vec<Uuid>,
    #[serde(default)]
    pub(super) assigned_workers: Vec<AssignedWorker>,
}

#[derive(Debug, Default)]
pub(super) struct Members {
    pub(super) supervisors: HashMap<Uuid, Vec<Uuid>>,
    pub(super) workers: HashMap<Uuid, Vec<AssignedWorker>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectDetails {
    #[serde(flatten)]
    pub(super) project: project::Model,
    pub(super) supervisors: Vec<Uuid>,
    pub(super) assigned_workers: Vec<AssignedWorker>,
}

impl ProjectDetails {
    pub(super) fn new(project: project::Model, members: &mut Members) -> Self {
        Self {
            supervisors: members.supervisors.remove(&project.id).unwrap_or_default(),
            assigned_workers: members.workers.remove(&project.id).unwrap_or_default(),
            project,
        }
    }
}
