// HTTP router

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::log_error;

use super::{
    attachments, auth, calibration, categories, dashboard, machines, operators, projects, reports,
    users, ApiContext, InternalErrorCause,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: VERSION,
    })
}

/// Logs every request and the cause of internal errors
async fn log_requests(State(ctx): State<ApiContext>, req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    if let Some(cause) = response.extensions().get::<InternalErrorCause>() {
        let logger = &ctx.logger;
        log_error!(logger, format!("{} {}: {}", method, path, cause.0));
    }

    ctx.logger.log_request(&method, &path, response.status().as_u16());

    response
}

/// Builds the router of the API
pub fn build_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-code", post(auth::resend_code))
        .route("/login", post(auth::login_handler))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout_handler))
        .route("/profile", put(auth::update_profile))
        .route("/change-password", put(auth::change_password));

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/bulk-delete", post(users::bulk_delete_users))
        .route("/{id}", put(users::update_user).delete(users::delete_user));

    let project_routes = Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/bulk-delete", post(projects::bulk_delete_projects))
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        );

    let category_routes = Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/bulk-delete", post(categories::bulk_delete_categories))
        .route(
            "/{id}",
            put(categories::update_category).delete(categories::delete_category),
        );

    let report_routes = Router::new()
        .route("/", get(reports::list_reports).post(reports::create_report))
        .route("/bulk-delete", post(reports::bulk_delete_reports))
        .route("/export", post(reports::export_reports))
        .route(
            "/{id}",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        )
        .route("/{id}/status", patch(reports::toggle_report_status))
        .route(
            "/{id}/attachments",
            get(attachments::list_attachments).post(attachments::register_attachment),
        );

    let attachment_routes = Router::new()
        .route("/{id}", delete(attachments::delete_attachment))
        .route("/{id}/download", get(attachments::download_attachment));

    let machine_routes = Router::new()
        .route("/", get(machines::list_machines).post(machines::create_machine))
        .route("/bulk-delete", post(machines::bulk_delete_machines))
        .route(
            "/{id}",
            get(machines::get_machine)
                .put(machines::update_machine)
                .delete(machines::delete_machine),
        );

    let operator_routes = Router::new()
        .route("/", get(operators::list_operators).post(operators::create_operator))
        .route("/bulk-delete", post(operators::bulk_delete_operators))
        .route(
            "/{id}",
            get(operators::get_operator)
                .put(operators::update_operator)
                .delete(operators::delete_operator),
        );

    let calibration_routes = Router::new()
        .route(
            "/",
            get(calibration::list_calibration_devices).post(calibration::create_calibration_device),
        )
        .route(
            "/{id}",
            put(calibration::update_calibration_device)
                .delete(calibration::delete_calibration_device),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/categories", category_routes)
        .nest("/reports", report_routes)
        .nest("/attachments", attachment_routes)
        .nest("/machines", machine_routes)
        .nest("/operators", operator_routes)
        .nest("/calibration-devices", calibration_routes)
        .route("/dashboard/stats", get(dashboard::dashboard_stats));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(ctx.clone(), log_requests))
        .layer(cors)
        .with_state(ctx)
}

// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{HeaderMap, StatusCode},
    };
    use chrono::{Datelike, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::{hash_password, AuthConfiguration},
        log::Logger,
        models::{Role, User},
        store::{MemoryStore, Store},
    };

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
        upload_dir: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> TestApp {
            let store = Arc::new(MemoryStore::new());
            let upload_dir = tempfile::tempdir().unwrap();

            let ctx = ApiContext::new(
                Arc::new(Logger::new_disabled()),
                store.clone(),
                Arc::new(AuthConfiguration {
                    jwt_secret: "router-test-secret".to_string(),
                    token_lifetime_minutes: 60,
                    allow_unmarked_credentials: false,
                }),
                upload_dir.path().to_path_buf(),
            );

            TestApp {
                router: build_router(ctx),
                store,
                upload_dir,
            }
        }

        async fn add_user(&self, username: &str, role: Role, firm: Option<&str>) {
            let mut user = User::new(
                username,
                &format!("{}@example.com", username),
                hash_password("password1").unwrap(),
                role,
            );
            user.firm_name = firm.map(|f| f.to_string());
            user.email_verified = true;

            self.store.insert_user(&user).await.unwrap();
        }

        async fn user_id(&self, username: &str) -> String {
            self.store
                .find_user_by_username(username)
                .await
                .unwrap()
                .unwrap()
                .id
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, HeaderMap, Vec<u8>) {
            let mut builder = axum::http::Request::builder().method(method).uri(uri);

            if let Some(t) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {}", t));
            }

            let request = match body {
                Some(b) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&b).unwrap()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

            (status, headers, bytes.to_vec())
        }

        async fn send_json(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, _, bytes) = self.send(method, uri, token, body).await;
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };

            (status, value)
        }

        async fn login(&self, username: &str) -> String {
            let (status, body) = self
                .send_json(
                    Method::POST,
                    "/api/auth/login",
                    None,
                    Some(json!({
                        "email": format!("{}@example.com", username),
                        "password": "password1",
                    })),
                )
                .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["token_type"], "bearer");

            body["access_token"].as_str().unwrap().to_string()
        }

        async fn create_project(&self, token: &str) -> String {
            let (status, body) = self
                .send_json(
                    Method::POST,
                    "/api/projects",
                    Some(token),
                    Some(json!({ "name": "North Depot" })),
                )
                .await;

            assert_eq!(status, StatusCode::OK);

            body["id"].as_str().unwrap().to_string()
        }

        async fn create_report(&self, token: &str, project_id: &str, city: &str, firm: &str) -> (StatusCode, Value) {
            self.send_json(
                Method::POST,
                "/api/reports",
                Some(token),
                Some(json!({
                    "project_id": project_id,
                    "city": city,
                    "equipment_name": "Tower crane",
                    "category": "Lifting",
                    "firm": firm,
                })),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();

        let (status, body) = app.send_json(Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_missing_or_bad_credential() {
        let app = TestApp::new();

        let (status, headers, bytes) = app.send(Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers.get("www-authenticate").unwrap(), "Bearer");

        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["detail"], "Not authenticated");

        let (status, _) = app
            .send_json(Method::GET, "/api/auth/me", Some("not-a-token"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_single_session_per_account() {
        let app = TestApp::new();
        app.add_user("inspector1", Role::Inspector, None).await;

        let first = app.login("inspector1").await;

        let (status, body) = app.send_json(Method::GET, "/api/auth/me", Some(&first), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "inspector1");

        let second = app.login("inspector1").await;

        let (status, _) = app.send_json(Method::GET, "/api/auth/me", Some(&first), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.send_json(Method::GET, "/api/auth/me", Some(&second), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send_json(Method::POST, "/api/auth/logout", Some(&second), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.send_json(Method::GET, "/api/auth/me", Some(&second), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let app = TestApp::new();
        app.add_user("inspector1", Role::Inspector, None).await;

        let (status, body) = app
            .send_json(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": "inspector1@example.com", "password": "nope" })),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Incorrect email or password");
    }

    #[tokio::test]
    async fn test_report_creation_and_roles() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("viewer", Role::Viewer, Some("Acme")).await;

        let admin = app.login("admin").await;
        let viewer = app.login("viewer").await;
        let year = Utc::now().year();

        let project_id = app.create_project(&admin).await;

        let (status, body) = app.create_report(&admin, &project_id, "Ankara", "Acme").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report_number"], format!("PK{}-ANK001", year));

        let (status, body) = app.create_report(&admin, &project_id, "Ankara", "Globex").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report_number"], format!("PK{}-ANK002", year));

        let (status, body) = app.create_report(&admin, &project_id, "Gotham", "Acme").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Unknown city: Gotham");

        let (status, _) = app.create_report(&viewer, &project_id, "Ankara", "Acme").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send_json(Method::POST, "/api/projects", Some(&viewer), Some(json!({ "name": "x" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send_json(Method::GET, "/api/reports", Some(&viewer), None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["firm"], "Acme");

        let (status, body) = app
            .send_json(Method::GET, "/api/reports?firm=Globex", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_registration_requires_known_firm() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;

        let register = json!({
            "username": "newviewer",
            "email": "newviewer@example.com",
            "password": "secret1",
            "password_confirm": "secret1",
            "firm_name": "Acme",
        });

        let (status, body) = app
            .send_json(Method::POST, "/api/auth/register", None, Some(register.clone()))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "FIRM_NOT_FOUND");

        let admin = app.login("admin").await;
        let project_id = app.create_project(&admin).await;
        app.create_report(&admin, &project_id, "Ankara", "Acme").await;

        let (status, body) = app
            .send_json(Method::POST, "/api/auth/register", None, Some(register.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "viewer");
        assert_eq!(body["email_verified"], false);

        let (status, _) = app
            .send_json(Method::POST, "/api/auth/register", None, Some(register))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let code = app
            .store
            .find_user_by_email("newviewer@example.com")
            .await
            .unwrap()
            .unwrap()
            .verification_code
            .unwrap();

        let (status, _) = app
            .send_json(
                Method::POST,
                "/api/auth/verify-email",
                None,
                Some(json!({ "email": "newviewer@example.com", "code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let stored = app
            .store
            .find_user_by_email("newviewer@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.email_verified);
        assert!(stored.verification_code.is_none());
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;

        let admin = app.login("admin").await;

        let (_, me) = app.send_json(Method::GET, "/api/auth/me", Some(&admin), None).await;
        let id = me["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .send_json(Method::DELETE, &format!("/api/users/{}", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .send_json(Method::POST, "/api/users/bulk-delete", Some(&admin), Some(json!([id])))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_download() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;

        let admin = app.login("admin").await;
        let project_id = app.create_project(&admin).await;
        let (_, report) = app.create_report(&admin, &project_id, "Ankara", "Acme").await;

        let (status, headers, bytes) = app
            .send(
                Method::POST,
                "/api/reports/export",
                Some(&admin),
                Some(json!({ "report_ids": [report["id"]] })),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/zip");

        let disposition = headers
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Reports_1Categories_1Reports_"));

        // ZIP local file header magic
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let (status, _) = app
            .send_json(
                Method::POST,
                "/api/reports/export",
                Some(&admin),
                Some(json!({ "report_ids": [] })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_demotion_survives_profile_update() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("inspector1", Role::Inspector, None).await;

        let admin = app.login("admin").await;
        let inspector = app.login("inspector1").await;
        let inspector_id = app.user_id("inspector1").await;

        let (status, body) = app
            .send_json(
                Method::PUT,
                &format!("/api/users/{}", inspector_id),
                Some(&admin),
                Some(json!({ "role": "viewer" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "viewer");

        // The session of the demoted account is kept
        let (status, body) = app
            .send_json(
                Method::PUT,
                "/api/auth/profile",
                Some(&inspector),
                Some(json!({ "city": "Ankara" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "viewer");
        assert_eq!(body["city"], "Ankara");

        let stored = app.store.find_user(&inspector_id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Viewer);
        assert_eq!(stored.city.as_deref(), Some("Ankara"));

        let (status, _) = app.create_report(&inspector, "any", "Ankara", "Acme").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_attachments() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("viewer", Role::Viewer, Some("Globex")).await;

        let admin = app.login("admin").await;
        let viewer = app.login("viewer").await;
        let project_id = app.create_project(&admin).await;
        let (_, report) = app.create_report(&admin, &project_id, "Ankara", "Acme").await;
        let report_id = report["id"].as_str().unwrap();

        std::fs::create_dir(app.upload_dir.path().join("photos")).unwrap();
        std::fs::write(app.upload_dir.path().join("photos/hook.png"), b"png-bytes").unwrap();

        let uri = format!("/api/reports/{}/attachments", report_id);

        let (status, _) = app
            .send_json(Method::POST, &uri, Some(&admin), Some(json!({ "path": "../hook.png" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .send_json(Method::POST, &uri, Some(&admin), Some(json!({ "path": "photos/missing.png" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "File not found on disk");

        let (status, attachment) = app
            .send_json(
                Method::POST,
                &uri,
                Some(&admin),
                Some(json!({ "path": "photos/hook.png", "file_name": "Kanca fotoğrafı.png" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(attachment["report_id"], report_id);

        let attachment_id = attachment["id"].as_str().unwrap();

        let (status, body) = app.send_json(Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        // Other firms cannot see the report or its files
        let (status, _) = app.send_json(Method::GET, &uri, Some(&viewer), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let download = format!("/api/attachments/{}/download", attachment_id);

        let (status, _, _) = app.send(Method::GET, &download, Some(&viewer), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, headers, bytes) = app.send(Method::GET, &download, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"png-bytes");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(
            headers.get("content-disposition").unwrap(),
            "inline; filename=\"Kanca foto_raf_.png\""
        );
        assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=3600");

        let (status, _) = app
            .send_json(Method::DELETE, &format!("/api/attachments/{}", attachment_id), Some(&viewer), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send_json(Method::DELETE, &format!("/api/attachments/{}", attachment_id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!app.upload_dir.path().join("photos/hook.png").exists());

        let (status, body) = app.send_json(Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_machines_and_operators() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("inspector1", Role::Inspector, None).await;
        app.add_user("viewer", Role::Viewer, Some("Acme")).await;

        let admin = app.login("admin").await;
        let inspector = app.login("inspector1").await;
        let viewer = app.login("viewer").await;
        let project_id = app.create_project(&admin).await;

        let machine = json!({
            "project_id": project_id,
            "machine_type": "Excavator",
            "firm": "Acme",
            "plate_or_serial": "06 ABC 123",
        });

        let (status, _) = app
            .send_json(Method::POST, "/api/machines", Some(&viewer), Some(machine.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .send_json(
                Method::POST,
                "/api/machines",
                Some(&inspector),
                Some(json!({
                    "project_id": "missing",
                    "machine_type": "Excavator",
                    "firm": "Acme",
                    "plate_or_serial": "06 XYZ 1",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, created) = app
            .send_json(Method::POST, "/api/machines", Some(&inspector), Some(machine.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["project_name"], "North Depot");
        assert_eq!(created["status"], "active");

        let (status, _) = app
            .send_json(Method::POST, "/api/machines", Some(&admin), Some(machine))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let machine_uri = format!("/api/machines/{}", created["id"].as_str().unwrap());

        let (status, updated) = app
            .send_json(
                Method::PUT,
                &machine_uri,
                Some(&inspector),
                Some(json!({ "status": "passive", "phone": "555 0000" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "passive");
        assert_eq!(updated["phone"], "555 0000");
        assert_eq!(updated["plate_or_serial"], "06 ABC 123");
        assert!(updated["updated_at"].is_string());

        let (status, listed) = app.send_json(Method::GET, "/api/machines", Some(&viewer), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = app.send_json(Method::DELETE, &machine_uri, Some(&inspector), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.send_json(Method::DELETE, &machine_uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.send_json(Method::GET, &machine_uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let operator = |number: &str| {
            json!({
                "project_id": project_id,
                "full_name": "Ali Veli",
                "phone": "555",
                "certificate_number": number,
                "valid_until": "2030-01-01",
            })
        };

        let (status, first) = app
            .send_json(Method::POST, "/api/operators", Some(&inspector), Some(operator("OP-1")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "valid");

        let (status, second) = app
            .send_json(Method::POST, "/api/operators", Some(&inspector), Some(operator("OP-2")))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send_json(
                Method::PUT,
                &format!("/api/operators/{}", second["id"].as_str().unwrap()),
                Some(&inspector),
                Some(json!({ "certificate_number": "OP-1" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .send_json(
                Method::POST,
                "/api/operators/bulk-delete",
                Some(&admin),
                Some(json!([first["id"], second["id"], "missing"])),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_count"], 2);
    }

    #[tokio::test]
    async fn test_calibration_devices() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("inspector1", Role::Inspector, None).await;

        let admin = app.login("admin").await;
        let inspector = app.login("inspector1").await;

        let fields = json!({
            "device_name": "Load cell",
            "serial_number": "LC-100",
            "calibration_date": "2025-01-15",
        });

        let (status, _) = app
            .send_json(Method::POST, "/api/calibration-devices", Some(&inspector), Some(fields.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, device) = app
            .send_json(Method::POST, "/api/calibration-devices", Some(&admin), Some(fields))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(device["created_by_username"], "admin");

        let uri = format!("/api/calibration-devices/{}", device["id"].as_str().unwrap());

        let (status, updated) = app
            .send_json(
                Method::PUT,
                &uri,
                Some(&admin),
                Some(json!({
                    "device_name": "Load cell",
                    "serial_number": "LC-100",
                    "calibration_date": "2026-01-15",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["calibration_date"], "2026-01-15");
        assert_eq!(updated["created_by_username"], "admin");

        let (status, listed) = app
            .send_json(Method::GET, "/api/calibration-devices", Some(&inspector), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, _) = app.send_json(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.send_json(Method::DELETE, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let app = TestApp::new();
        app.add_user("admin", Role::Admin, None).await;
        app.add_user("viewer", Role::Viewer, Some("Acme")).await;

        let admin = app.login("admin").await;
        let viewer = app.login("viewer").await;
        let project_id = app.create_project(&admin).await;

        app.create_report(&admin, &project_id, "Ankara", "Acme").await;
        app.create_report(&admin, &project_id, "Konya", "Globex").await;

        let (status, _) = app
            .send_json(Method::GET, "/api/dashboard/stats", Some(&viewer), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .send_json(Method::GET, "/api/dashboard/stats", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_reports"], 2);
        assert_eq!(body["monthly_reports"], 2);
        assert_eq!(body["categories"][0]["category"], "Lifting");
        assert_eq!(body["categories"][0]["count"], 2);
    }
}
