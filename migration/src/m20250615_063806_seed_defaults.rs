use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250613_083042_init::{Role, User, Worker};

#[derive(DeriveMigrationName)]
pub struct Migration;

const ADMIN_ID: u128 = 12345;
const DEMO_WORKERS: u128 = 20;

/// Role name and its default daily wage
const DEFAULT_ROLES: [(&str, i64); 5] = [
    ("Mason", 800),
    ("Carpenter", 750),
    ("Electrician", 850),
    ("Plumber", 800),
    ("Helper", 500),
];

fn seeded_id(i: u128) -> SimpleExpr {
    Expr::val(format!("{:032x}", i)).cast_as("uuid")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-06-15T06:58:41.474Z").cast_as("timestamptz");

        // Create an admin, supervisors are registered by it afterwards

        let hashed_password = &sha2::Sha256::digest("admin:admin")[..];

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                .values_panic([seeded_id(ADMIN_ID), time.clone(), time.clone(), "admin".into(), hashed_password.into(), Expr::val("admin").cast_as("role_type")])
                .to_owned()
        ).await?;

        let mut roles = Query::insert()
            .into_table(Role::Table)
            .columns(["created_at", "updated_at", "role_name", "default_salary"])
            .to_owned();
        for (name, salary) in DEFAULT_ROLES {
            roles.values_panic([time.clone(), time.clone(), name.into(), salary.into()]);
        }
        manager.exec_stmt(roles).await?;

        // Demo crew without a site, base salaries vary so rate fallbacks show up
        for i in 1..=DEMO_WORKERS {
            let (role, default_salary) = DEFAULT_ROLES[(i as usize) % DEFAULT_ROLES.len()];
            let base_salary = (i % 3 != 0).then(|| rand::random_range(default_salary - 100..=default_salary + 150));

            manager
                .exec_stmt(Query::insert()
                    .into_table(Worker::Table)
                    .columns(["id", "created_at", "updated_at", "created_by", "updated_by", "name", "role", "base_salary"])
                    .values_panic([seeded_id(i), time.clone(), time.clone(), seeded_id(ADMIN_ID), seeded_id(ADMIN_ID), format!("Worker {i}").into(), role.into(), base_salary.into()])
                    .to_owned()
            ).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete()
                .from_table(Worker::Table)
                .and_where(Expr::col("id").is_in((1..=DEMO_WORKERS).map(seeded_id)))
                .to_owned()
        ).await?;

        manager
            .exec_stmt(Query::delete()
                .from_table(Role::Table)
                .and_where(Expr::col("role_name").is_in(DEFAULT_ROLES.map(|(name, _)| name)))
                .to_owned()
        ).await?;

        manager
            .exec_stmt(Query::delete()
                .from_table(User::Table)
                .and_where(Expr::col("id").eq(seeded_id(ADMIN_ID)))
                .to_owned()
        ).await?;

        Ok(())
    }
}
