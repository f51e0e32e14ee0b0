//! HTTP router: a composable `Router` mounting every administrative
//! operation under `/api/`. Authentication is the caller's concern;
//! this surface binds to loopback by default.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::AppState;

pub fn api_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        // Entities
        .route("/doctors", get(endpoints::doctors::list).post(endpoints::doctors::create))
        .route(
            "/doctors/:id",
            get(endpoints::doctors::detail)
                .put(endpoints::doctors::update)
                .delete(endpoints::doctors::remove),
        )
        .route("/staff", get(endpoints::staff::list).post(endpoints::staff::create))
        .route("/staff/:id", get(endpoints::staff::detail))
        .route(
            "/staff/:id/shifts",
            get(endpoints::staff::shifts).post(endpoints::staff::create_shift),
        )
        .route("/patients", get(endpoints::patients::list).post(endpoints::patients::create))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail).put(endpoints::patients::update),
        )
        .route("/patients/:id/tests", get(endpoints::records::tests_for_patient))
        // Clinical records
        .route(
            "/history",
            get(endpoints::records::history).post(endpoints::records::create_history),
        )
        .route("/tests", post(endpoints::records::create_test))
        .route(
            "/prescriptions",
            get(endpoints::prescriptions::lines).post(endpoints::prescriptions::create),
        )
        .route("/prescriptions/:id", get(endpoints::prescriptions::detail))
        // Appointment lifecycle
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route("/appointments/expire", post(endpoints::appointments::expire))
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail).delete(endpoints::appointments::remove),
        )
        .route("/appointments/:id/assign", post(endpoints::appointments::assign))
        .route("/appointments/:id/complete", post(endpoints::appointments::complete))
        .route("/appointments/:id/cancel", post(endpoints::appointments::cancel))
        // Bed occupancy
        .route("/beds/available", get(endpoints::beds::available))
        .route("/beds/occupied", get(endpoints::beds::occupied))
        .route("/beds/assign", post(endpoints::beds::assign))
        .route("/beds/:id/release", post(endpoints::beds::release))
        .route("/beds/invariants", get(endpoints::beds::invariants))
        // Notifications
        .route(
            "/notifications",
            get(endpoints::notifications::list).post(endpoints::notifications::send),
        )
        .route("/notifications/:id/read", post(endpoints::notifications::mark_read))
        // Question catalog
        .route("/reports/catalog", get(endpoints::reports::catalog))
        .route("/reports/doctors-by-specialty", get(endpoints::reports::doctors_by_specialty))
        .route(
            "/reports/doctors-with-specialties",
            get(endpoints::reports::doctors_with_specialties),
        )
        .route("/reports/doctor-email", get(endpoints::reports::doctor_email))
        .route("/reports/staff-by-department", get(endpoints::reports::staff_by_department))
        .route("/reports/upcoming-shifts", get(endpoints::reports::upcoming_shifts))
        .route("/reports/doctor-for-patient", get(endpoints::reports::doctor_for_patient))
        .route("/reports/patients-of-doctor", get(endpoints::reports::patients_of_doctor))
        .route("/reports/patient-email", get(endpoints::reports::patient_email))
        .route(
            "/reports/appointments-for-doctor",
            get(endpoints::reports::appointments_for_doctor),
        )
        .route(
            "/reports/appointments-in-range",
            get(endpoints::reports::appointments_in_range),
        )
        .route(
            "/reports/appointments-by-specialty",
            get(endpoints::reports::appointments_by_specialty),
        );

    Router::new().nest("/api", api).with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(addr: std::net::SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP front-end listening");
    axum::serve(listener, api_router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::seed::seed_demo_data;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let conn = open_memory_database().unwrap();
        seed_demo_data(&conn).unwrap();
        api_router(AppState::new(conn))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, json) = get_json(test_router(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn doctors_by_specialty_round_trip() {
        let (status, json) =
            get_json(test_router(), "/api/reports/doctors-by-specialty?specialty=Cardiologist")
                .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert!(names.contains(&"Dr. John Smith".to_string()));
    }

    #[tokio::test]
    async fn unknown_doctor_is_404_with_code() {
        let (status, json) = get_json(test_router(), "/api/doctors/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn full_ward_assign_is_409_no_capacity() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/beds/assign")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"patient_id": 11, "ward_id": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NO_CAPACITY");
    }

    #[tokio::test]
    async fn complete_open_appointment_is_409() {
        let router = test_router();
        // Appointment 3 is seeded Open.
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/appointments/3/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn catalog_lists_eleven_questions() {
        let (status, json) = get_json(test_router(), "/api/reports/catalog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["questions"].as_array().unwrap().len(), 11);
    }
}
