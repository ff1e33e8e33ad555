use super::*;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AttendanceSummary {
    pub(super) worker_id: Uuid,
    pub(super) site_id: Uuid,
    pub(super) total_attendance_days: Decimal,
    pub(super) dates_present: Vec<NaiveDate>,
}
