pub use super::activity_log::Entity as ActivityLog;
pub use super::advance::Entity as Advance;
pub use super::attendance::Entity as Attendance;
pub use super::material_log::Entity as MaterialLog;
pub use super::project::Entity as Project;
pub use super::project_supervisor::Entity as ProjectSupervisor;
pub use super::role::Entity as Role;
pub use super::salary_log::Entity as SalaryLog;
pub use super::user::Entity as User;
pub use super::worker::Entity as Worker;
pub use super::worker_assignment::Entity as WorkerAssignment;
