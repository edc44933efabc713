mod doc;
mod dtos;
mod error;
mod routes;
mod settings;
mod state;
mod utils;

use crate::doc::ApiDoc;
use crate::settings::SettingsStore;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};
use database::config::LifecycleConfig;
use database::db::create_connection;
use log::info;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db = create_connection()
        .await
        .expect("Failed to connect to database");

    let state = AppState {
        db,
        lifecycle: LifecycleConfig::from_env(),
        settings: SettingsStore::from_env(),
    };

    let app = Router::new()
        .route("/", get(routes::root::root))
        .route("/health", get(routes::health::health))
        .route(
            "/faculties",
            get(routes::catalog::list_faculties).post(routes::catalog::create_faculty),
        )
        .route(
            "/faculties/{id}",
            put(routes::catalog::rename_faculty).delete(routes::catalog::delete_faculty),
        )
        .route(
            "/programs",
            get(routes::catalog::list_programs).post(routes::catalog::create_program),
        )
        .route(
            "/programs/{id}",
            put(routes::catalog::rename_program).delete(routes::catalog::delete_program),
        )
        .route(
            "/student-statuses",
            get(routes::catalog::list_statuses).post(routes::catalog::create_status),
        )
        .route(
            "/student-statuses/{id}",
            put(routes::catalog::rename_status).delete(routes::catalog::delete_status),
        )
        .route(
            "/courses",
            get(routes::course::list_courses).post(routes::course::create_course),
        )
        .route(
            "/courses/{code}",
            get(routes::course::get_course)
                .patch(routes::course::update_course)
                .delete(routes::course::delete_course),
        )
        .route(
            "/classes",
            get(routes::class::list_classes).post(routes::class::create_class),
        )
        .route(
            "/classes/{code}",
            get(routes::class::get_class)
                .patch(routes::class::update_class)
                .delete(routes::class::delete_class),
        )
        .route(
            "/students",
            get(routes::student::list_students).post(routes::student::create_student),
        )
        .route(
            "/students/{number}",
            get(routes::student::get_student)
                .patch(routes::student::update_student)
                .delete(routes::student::delete_student),
        )
        .route(
            "/enrollments",
            get(routes::enrollment::list_enrollments).post(routes::enrollment::create_enrollment),
        )
        .route(
            "/enrollments/{id}",
            get(routes::enrollment::get_enrollment).patch(routes::enrollment::update_enrollment),
        )
        .route(
            "/settings/email-domains",
            get(routes::settings::get_email_domains).put(routes::settings::put_email_domains),
        )
        .route(
            "/settings/status-transitions",
            get(routes::settings::get_status_rules).put(routes::settings::put_status_rules),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(CompressionLayer::new()))
        .with_state(state);

    let bind_addr = dotenvy::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    info!("Running axum on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown::shutdown_signal())
        .await
        .unwrap();
}
