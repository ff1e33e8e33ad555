use std::collections::{BTreeMap, BTreeSet};

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{entity::{attendance, prelude::*, user}, error::ApiError, payroll::{self, NewAttendance, PairKey, Scope, WeekWindow}};

use super::{access::{ensure_site_access, SiteScope}, query::EntryFilter};

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_attendance)
        .service(attendance_overview)
        .service(mark_attendance)
        .service(delete_attendance);
}

async fn find_entries(db: &DatabaseConnection, user: &user::Model, filter: &EntryFilter) -> Result<Vec<attendance::Model>, ApiError> {
    let scope = SiteScope::resolve(db, user, filter.site_id).await?;

    let query = scope.apply(Attendance::find(), attendance::Column::SiteId);
    let query = filter.apply_worker(query, attendance::Column::WorkerId);
    let query = filter.apply_dates(query, attendance::Column::Date);

    Ok(
        query
            .order_by_desc(attendance::Column::Date)
            .all(db).await?
    )
}

#[get("")]
async fn list_attendance(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<EntryFilter>) -> Result<impl Responder, ApiError> {
    Ok(web::Json(find_entries(db.get_ref(), &user, &filter).await?))
}

/// Day credits per worker and site over the requested range
#[get("/overview")]
async fn attendance_overview(db: web::Data<DatabaseConnection>, user: user::Model, filter: web::Query<EntryFilter>) -> Result<impl Responder, ApiError> {
    let (Some(start), Some(end)) = (filter.start_date, filter.end_date) else {
        return Err(ApiError::BadRequest("startDate and endDate are required".to_string()));
    };
    if end < start {
        return Err(payroll::PayrollError::InvalidDateRange { start, end }.into());
    }

    let entries = find_entries(db.get_ref(), &user, &filter).await?;
    let totals = payroll::aggregate_attendance(&entries, &Scope::default(), &WeekWindow { start, end });

    let mut dates = BTreeMap::<PairKey, BTreeSet<NaiveDate>>::new();
    for entry in &entries {
        dates.entry(PairKey::new(entry.worker_id, entry.site_id)).or_default().insert(entry.date);
    }

    Ok(web::Json(
        totals.into_iter()
            .map(|(pair, total_attendance_days)| AttendanceSummary {
                worker_id: pair.worker_id,
                site_id: pair.site_id,
                total_attendance_days,
                dates_present: dates.remove(&pair).unwrap_or_default().into_iter().collect(),
            })
            .collect::<Vec<_>>()
    ))
}

#[post("/mark")]
async fn mark_attendance(db: web::Data<DatabaseConnection>, user: user::Model, payload: web::Json<NewAttendance>) -> Result<impl Responder, ApiError> {
    ensure_site_access(db.get_ref(), &user, payload.site_id).await?;

    let entry = payroll::record_attendance(db.get_ref(), &user, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(entry))
}

#[delete("/{id}")]
async fn delete_attendance(db: web::Data<DatabaseConnection>, user: user::Model, id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let entry = Attendance::find_by_id(*id)
        .one(db.get_ref()).await?
        .ok_or(ApiError::NotFound("attendance entry"))?;

    ensure_site_access(db.get_ref(), &user, entry.site_id).await?;

    Attendance::delete_by_id(entry.id).exec(db.get_ref()).await?;

    info!(attendance_id = %entry.id, by = %user.id, "attendance entry deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use chrono::{Duration, Local};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::Authority, entity::{project, project_supervisor, sea_orm_active_enums::{RoleType, ShiftType}, worker}};

    use super::*;

    fn user(role: RoleType) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            username: "sunil".to_string(),
            password: Vec::new(),
            role,
        }
    }

    fn token(user: &user::Model) -> String {
        Authority::new(b"secret", Duration::hours(1)).issue_for(user).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn entry(worker_id: Uuid, site_id: Uuid, date: NaiveDate, shift_type: ShiftType) -> attendance::Model {
        attendance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            worker_id,
            site_id,
            date,
            shift_type,
            multiplier: shift_type.multiplier(),
        }
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Mark {
        site_id: Uuid,
        worker_id: Uuid,
        date: NaiveDate,
        shift_type: &'static str,
    }

    #[actix_web::test]
    async fn test_mark_attendance() {
        let supervisor = user(RoleType::Supervisor);
        let (worker_id, site_id) = (Uuid::new_v4(), Uuid::new_v4());
        let stored = entry(worker_id, site_id, day(4), ShiftType::OneAndAHalfDay);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ project_supervisor::Model { project_id: site_id, user_id: supervisor.id } ] ])
            .append_query_results([ vec![ worker::Model {
                id: worker_id,
                created_at: Local::now().into(),
                updated_at: Local::now().into(),
                created_by: None,
                updated_by: None,
                name: "Raju".to_string(),
                role: "Helper".to_string(),
                base_salary: None,
                rfid_id: None,
            } ] ])
            .append_query_results([ vec![ project::Model {
                id: site_id,
                created_at: Local::now().into(),
                updated_at: Local::now().into(),
                created_by: None,
                updated_by: None,
                name: "Metro Depot".to_string(),
                site_type: "Infrastructure".to_string(),
                location: "Nagpur".to_string(),
                start_date: day(1),
            } ] ])
            .append_query_results([ vec![ stored.clone() ] ])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(b"secret", Duration::hours(1))))
                .app_data(web::Data::new(db))
                .service(web::scope("/attendance").configure(config))
        ).await;

        let req = test::TestRequest::post()
            .uri("/attendance/mark")
            .insert_header(("Authorization", format!("Bearer {}", token(&supervisor))))
            .set_json(Mark { site_id, worker_id, date: day(4), shift_type: "One-and-a-Half Day" })
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: attendance::Model = test::read_body_json(response).await;
        assert_eq!(body.shift_type, ShiftType::OneAndAHalfDay);
        assert_eq!(body.multiplier, dec!(1.5));
    }

    #[actix_web::test]
    async fn test_mark_attendance_rejects_unknown_shift_and_foreign_site() {
        let supervisor = user(RoleType::Supervisor);
        let (worker_id, site_id) = (Uuid::new_v4(), Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ project_supervisor::Model { project_id: site_id, user_id: supervisor.id } ],
                vec![],
            ])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(b"secret", Duration::hours(1))))
                .app_data(web::Data::new(db))
                .service(web::scope("/attendance").configure(config))
        ).await;

        let req = test::TestRequest::post()
            .uri("/attendance/mark")
            .insert_header(("Authorization", format!("Bearer {}", token(&supervisor))))
            .set_json(Mark { site_id, worker_id, date: day(4), shift_type: "Night Shift" })
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/attendance/mark")
            .insert_header(("Authorization", format!("Bearer {}", token(&supervisor))))
            .set_json(Mark { site_id, worker_id, date: day(4), shift_type: "Full Day" })
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_overview_sums_day_credits() {
        let admin = user(RoleType::Admin);
        let (worker_id, site_id) = (Uuid::new_v4(), Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![
                entry(worker_id, site_id, day(6), ShiftType::OneAndAHalfDay),
                entry(worker_id, site_id, day(4), ShiftType::HalfDayMorning),
                entry(worker_id, site_id, day(4), ShiftType::HalfDayEvening),
                entry(worker_id, site_id, day(2), ShiftType::FullDay),
            ] ])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(b"secret", Duration::hours(1))))
                .app_data(web::Data::new(db))
                .service(web::scope("/attendance").configure(config))
        ).await;

        let req = test::TestRequest::get()
            .uri("/attendance/overview?siteId=&startDate=2025-06-02&endDate=2025-06-08")
            .insert_header(("Authorization", format!("Bearer {}", token(&admin))))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::OK);

        let summaries: Vec<AttendanceSummary> = test::read_body_json(response).await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_attendance_days, dec!(3.5));
        assert_eq!(summaries[0].dates_present, vec![ day(2), day(4), day(6) ]);
    }
}
