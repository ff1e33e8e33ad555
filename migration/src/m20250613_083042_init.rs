use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_user_table_fk, util::{cascade_fk, default_table_statement, default_user_table_statement}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<RoleType>()
            ).await?;

        manager
            .create_type(
                schema.create_enum_from_active_enum::<ShiftType>()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // Password should be in a hashed format
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Role::Table)
                .col(ColumnDef::new(Role::RoleName)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Role::DefaultSalary)
                    .decimal_len(12, 2)
                    .not_null())
                .take()
            ).await?;

        // `role` holds the role name, renames are carried over by the application
        manager
            .create_table(default_user_table_statement()
                .table(Worker::Table)
                .col(ColumnDef::new(Worker::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Worker::Role)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Worker::BaseSalary)
                    .decimal_len(12, 2))
                .col(ColumnDef::new(Worker::RfidId)
                    .text())
                .take()
            ).await?;
        setup_user_table_fk!(manager, Worker::Table);

        manager
            .create_table(default_user_table_statement()
                .table(Project::Table)
                .col(ColumnDef::new(Project::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Project::Type)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Project::Location)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Project::StartDate)
                    .date()
                    .not_null())
                .take()
            ).await?;
        setup_user_table_fk!(manager, Project::Table);

        manager
            .create_table(TableCreateStatement::new()
                .if_not_exists()
                .table(ProjectSupervisor::Table)
                .col(ColumnDef::new(ProjectSupervisor::ProjectId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(ProjectSupervisor::UserId)
                    .uuid()
                    .not_null())
                .primary_key(Index::create()
                    .col(ProjectSupervisor::ProjectId)
                    .col(ProjectSupervisor::UserId))
                .take()
            ).await?;
        manager.create_foreign_key(cascade_fk(ProjectSupervisor::Table, ProjectSupervisor::ProjectId, Project::Table)).await?;
        manager.create_foreign_key(cascade_fk(ProjectSupervisor::Table, ProjectSupervisor::UserId, User::Table)).await?;

        manager
            .create_table(TableCreateStatement::new()
                .if_not_exists()
                .table(WorkerAssignment::Table)
                .col(ColumnDef::new(WorkerAssignment::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(WorkerAssignment::ProjectId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(WorkerAssignment::SalaryOverride)
                    .decimal_len(12, 2))
                .primary_key(Index::create()
                    .col(WorkerAssignment::WorkerId)
                    .col(WorkerAssignment::ProjectId))
                .take()
            ).await?;
        manager.create_foreign_key(cascade_fk(WorkerAssignment::Table, WorkerAssignment::WorkerId, Worker::Table)).await?;
        manager.create_foreign_key(cascade_fk(WorkerAssignment::Table, WorkerAssignment::ProjectId, Project::Table)).await?;

        manager
            .create_table(default_user_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Attendance::SiteId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Attendance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Attendance::ShiftType)
                    .custom(ShiftType::name())
                    .not_null())
                .col(ColumnDef::new(Attendance::Multiplier)
                    .decimal_len(4, 2)
                    .not_null())
                .take()
            ).await?;
        setup_user_table_fk!(manager, Attendance::Table);
        manager.create_foreign_key(cascade_fk(Attendance::Table, Attendance::WorkerId, Worker::Table)).await?;
        manager.create_foreign_key(cascade_fk(Attendance::Table, Attendance::SiteId, Project::Table)).await?;

        manager
            .create_index(Index::create()
                .name("attendance_site_date_idx")
                .table(Attendance::Table)
                .col(Attendance::SiteId)
                .col(Attendance::Date)
                .take()
            ).await?;

        manager
            .create_table(default_user_table_statement()
                .table(Advance::Table)
                .col(ColumnDef::new(Advance::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Advance::SiteId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Advance::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Advance::Amount)
                    .decimal_len(12, 2)
                    .not_null()
                    .check(Expr::col(Advance::Amount).gt(0)))
                .col(ColumnDef::new(Advance::Reason)
                    .text()
                    .not_null()
                    .default(""))
                .take()
            ).await?;
        setup_user_table_fk!(manager, Advance::Table);
        manager.create_foreign_key(cascade_fk(Advance::Table, Advance::WorkerId, Worker::Table)).await?;
        manager.create_foreign_key(cascade_fk(Advance::Table, Advance::SiteId, Project::Table)).await?;

        manager
            .create_table(default_user_table_statement()
                .table(MaterialLog::Table)
                .col(ColumnDef::new(MaterialLog::SiteId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(MaterialLog::Material)
                    .text()
                    .not_null())
                .col(ColumnDef::new(MaterialLog::Brand)
                    .text())
                .col(ColumnDef::new(MaterialLog::Quantity)
                    .decimal_len(12, 3)
                    .not_null())
                .col(ColumnDef::new(MaterialLog::Unit)
                    .text()
                    .not_null())
                .col(ColumnDef::new(MaterialLog::PricePerUnit)
                    .decimal_len(12, 2)
                    .not_null())
                .col(ColumnDef::new(MaterialLog::TotalCost)
                    .decimal_len(14, 2)
                    .not_null())
                .col(ColumnDef::new(MaterialLog::Date)
                    .date()
                    .not_null())
                .take()
            ).await?;
        setup_user_table_fk!(manager, MaterialLog::Table);
        manager.create_foreign_key(cascade_fk(MaterialLog::Table, MaterialLog::SiteId, Project::Table)).await?;

        manager
            .create_table(default_user_table_statement()
                .table(ActivityLog::Table)
                .col(ColumnDef::new(ActivityLog::SiteId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(ActivityLog::Message)
                    .text()
                    .not_null())
                .col(ColumnDef::new(ActivityLog::Date)
                    .date()
                    .not_null())
                .take()
            ).await?;
        setup_user_table_fk!(manager, ActivityLog::Table);
        manager.create_foreign_key(cascade_fk(ActivityLog::Table, ActivityLog::SiteId, Project::Table)).await?;

        manager
            .create_table(default_user_table_statement()
                .table(SalaryLog::Table)
                .col(ColumnDef::new(SalaryLog::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(SalaryLog::SiteId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(SalaryLog::WeekStart)
                    .date()
                    .not_null())
                .col(ColumnDef::new(SalaryLog::WeekEnd)
                    .date()
                    .not_null())
                .col(ColumnDef::new(SalaryLog::TotalAttendanceDays)
                    .decimal_len(6, 2)
                    .not_null())
                .col(ColumnDef::new(SalaryLog::GrossSalary)
                    .decimal_len(14, 2)
                    .not_null())
                .col(ColumnDef::new(SalaryLog::TotalAdvanceDeducted)
                    .decimal_len(14, 2)
                    .not_null())
                .col(ColumnDef::new(SalaryLog::NetSalary)
                    .decimal_len(14, 2)
                    .not_null()) // May go negative when advances exceed the gross
                .col(ColumnDef::new(SalaryLog::Paid)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(SalaryLog::PaymentDate)
                    .timestamp_with_time_zone())
                .take()
            ).await?;
        setup_user_table_fk!(manager, SalaryLog::Table);
        manager.create_foreign_key(cascade_fk(SalaryLog::Table, SalaryLog::WorkerId, Worker::Table)).await?;
        manager.create_foreign_key(cascade_fk(SalaryLog::Table, SalaryLog::SiteId, Project::Table)).await?;

        // Target of the calculator's ON CONFLICT
        manager
            .create_index(Index::create()
                .name("salary_log_worker_site_week_key")
                .table(SalaryLog::Table)
                .col(SalaryLog::WorkerId)
                .col(SalaryLog::SiteId)
                .col(SalaryLog::WeekStart)
                .col(SalaryLog::WeekEnd)
                .unique()
                .take()
            ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(SalaryLog::Table)
                .table(ActivityLog::Table)
                .table(MaterialLog::Table)
                .table(Advance::Table)
                .table(Attendance::Table)
                .table(WorkerAssignment::Table)
                .table(ProjectSupervisor::Table)
                .table(Project::Table)
                .table(Worker::Table)
                .table(Role::Table)
                .table(User::Table)
                .take()
        ).await?;

        manager
            .drop_type(
                TypeDropStatement::new()
                    .name(ShiftType::name())
                    .to_owned()
            ).await?;

        manager
            .drop_type(
                TypeDropStatement::new()
                    .name(RoleType::name())
                    .to_owned()
            ).await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "shift_type")]
enum ShiftType {
    #[sea_orm(string_value = "full_day")]
    FullDay,
    #[sea_orm(string_value = "one_and_a_half_day")]
    OneAndAHalfDay,
    #[sea_orm(string_value = "half_day_morning")]
    HalfDayMorning,
    #[sea_orm(string_value = "half_day_evening")]
    HalfDayEvening,
}

#[derive(Iden)]
pub(crate) enum Role {
    Table,
    RoleName,
    DefaultSalary,
}

#[derive(Iden)]
pub(crate) enum Worker {
    Table,
    Name,
    Role,
    BaseSalary,
    RfidId,
}

#[derive(Iden)]
enum Project {
    Table,
    Name,
    Type,
    Location,
    StartDate,
}

#[derive(Iden)]
enum ProjectSupervisor {
    Table,
    ProjectId,
    UserId,
}

#[derive(Iden)]
enum WorkerAssignment {
    Table,
    WorkerId,
    ProjectId,
    SalaryOverride,
}

#[derive(Iden)]
enum Attendance {
    Table,
    WorkerId,
    SiteId,
    Date,
    ShiftType,
    Multiplier,
}

#[derive(Iden)]
enum Advance {
    Table,
    WorkerId,
    SiteId,
    Date,
    Amount,
    Reason,
}

#[derive(Iden)]
enum MaterialLog {
    Table,
    SiteId,
    Material,
    Brand,
    Quantity,
    Unit,
    PricePerUnit,
    TotalCost,
    Date,
}

#[derive(Iden)]
enum ActivityLog {
    Table,
    SiteId,
    Message,
    Date,
}

#[derive(Iden)]
enum SalaryLog {
    Table,
    WorkerId,
    SiteId,
    WeekStart,
    WeekEnd,
    TotalAttendanceDays,
    GrossSalary,
    TotalAdvanceDeducted,
    NetSalary,
    Paid,
    PaymentDate,
}
