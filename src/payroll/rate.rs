use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{prelude::*, role, worker, worker_assignment};

use super::{PairKey, PayrollError};

/// Everything needed to price a day of work for a set of workers
#[derive(Debug, Default)]
pub struct RateBook {
    workers: HashMap<Uuid, worker::Model>,
    assignments: HashMap<PairKey, Option<Decimal>>,
    role_defaults: HashMap<String, Decimal>,
}

impl RateBook {
    pub fn new(
        workers: Vec<worker::Model>,
        assignments: Vec<worker_assignment::Model>,
        roles: Vec<role::Model>,
    ) -> Self {
        Self {
            workers: workers.into_iter().map(|w| (w.id, w)).collect(),
            assignments: assignments.into_iter()
                .map(|a| (PairKey::new(a.worker_id, a.project_id), a.salary_override))
                .collect(),
            role_defaults: roles.into_iter().map(|r| (r.role_name, r.default_salary)).collect(),
        }
    }

    pub async fn load<C: ConnectionTrait>(db: &C, worker_ids: &BTreeSet<Uuid>) -> Result<Self, DbErr> {
        let workers = Worker::find()
            .filter(worker::Column::Id.is_in(worker_ids.iter().copied()))
            .all(db).await?;

        let assignments = WorkerAssignment::find()
            .filter(worker_assignment::Column::WorkerId.is_in(worker_ids.iter().copied()))
            .all(db).await?;

        let roles = Role::find()
            .all(db).await?;

        Ok(Self::new(workers, assignments, roles))
    }

    pub fn is_assigned(&self, pair: &PairKey) -> bool {
        self.assignments.contains_key(pair)
    }

    /// Project override, then the worker's base salary, then the role's default
    pub fn resolve(&self, pair: &PairKey) -> Result<Decimal, PayrollError> {
        let worker = self.workers.get(&pair.worker_id)
            .ok_or(PayrollError::WorkerNotFound(pair.worker_id))?;

        self.assignments.get(pair).copied().flatten()
            .or(worker.base_salary)
            .or_else(|| self.role_defaults.get(&worker.role).copied())
            .ok_or(PayrollError::RateResolutionFailure { worker_id: pair.worker_id, site_id: pair.site_id })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use rust_decimal_macros::dec;

    use super::*;

    fn worker(id: Uuid, role: &str, base_salary: Option<Decimal>) -> worker::Model {
        worker::Model {
            id,
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            name: "Anil".to_string(),
            role: role.to_string(),
            base_salary,
            rfid_id: None,
        }
    }

    fn role(name: &str, default_salary: Decimal) -> role::Model {
        role::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            role_name: name.to_string(),
            default_salary,
        }
    }

    #[test]
    fn test_resolution_order() {
        let (w, s1, s2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let book = RateBook::new(
            vec![ worker(w, "Mason", Some(dec!(500))) ],
            vec![
                worker_assignment::Model { worker_id: w, project_id: s1, salary_override: Some(dec!(650)) },
                worker_assignment::Model { worker_id: w, project_id: s2, salary_override: None },
            ],
            vec![ role("Mason", dec!(450)) ],
        );

        assert_eq!(book.resolve(&PairKey::new(w, s1)).unwrap(), dec!(650));
        assert_eq!(book.resolve(&PairKey::new(w, s2)).unwrap(), dec!(500));
    }

    #[test]
    fn test_falls_back_to_role_default() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let book = RateBook::new(
            vec![ worker(w, "Helper", None) ],
            vec![ worker_assignment::Model { worker_id: w, project_id: s, salary_override: None } ],
            vec![ role("Mason", dec!(450)), role("Helper", dec!(350)) ],
        );

        assert_eq!(book.resolve(&PairKey::new(w, s)).unwrap(), dec!(350));
    }

    #[test]
    fn test_resolution_failures() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let book = RateBook::new(vec![ worker(w, "Painter", None) ], vec![], vec![ role("Mason", dec!(450)) ]);

        assert!(matches!(
            book.resolve(&PairKey::new(w, s)),
            Err(PayrollError::RateResolutionFailure { worker_id, site_id }) if worker_id == w && site_id == s
        ));

        let missing = Uuid::new_v4();
        assert!(matches!(
            book.resolve(&PairKey::new(missing, s)),
            Err(PayrollError::WorkerNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_unassigned_pair_still_resolves() {
        let (w, s) = (Uuid::new_v4(), Uuid::new_v4());

        let book = RateBook::new(vec![ worker(w, "Mason", Some(dec!(500))) ], vec![], vec![]);

        assert!(!book.is_assigned(&PairKey::new(w, s)));
        assert_eq!(book.resolve(&PairKey::new(w, s)).unwrap(), dec!(500));
    }
}
