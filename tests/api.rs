//! HTTP-level tests: the auth endpoints plus the authorization middleware
//! wrapped around probe routes.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, guard, test, web};
use serde_json::{Value, json};
use taskgate::auth::rbac::AccessDecision;
use taskgate::config::Config;
use taskgate::server::{self, middleware::Authorize};

/// Reports the decision the middleware attached to the request
async fn probe(req: HttpRequest) -> HttpResponse {
    let extensions = req.extensions();
    let decision = extensions
        .get::<AccessDecision>()
        .expect("middleware always attaches a decision on allow");
    HttpResponse::Ok().json(json!({
        "role": decision.role.name,
        "identity": decision.identity_id,
    }))
}

/// Echoes the JSON body, proving the middleware replays the payload it peeked
async fn echo_body(body: web::Json<Value>) -> HttpResponse {
    HttpResponse::Ok().json(body.into_inner())
}

macro_rules! test_app {
    () => {{
        let mut config = Config::default();
        config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
        let state = web::Data::new(server::build_state(config).unwrap());
        test::init_service(
            App::new()
                .app_data(state)
                .configure(server::configure)
                .service(
                    web::resource("/tasks")
                        .guard(guard::Get())
                        .wrap(Authorize::new("read", "tasks"))
                        .to(probe),
                )
                .service(
                    web::resource("/tasks")
                        .guard(guard::Post())
                        .wrap(Authorize::new("create", "tasks"))
                        .to(probe),
                )
                .service(
                    web::resource("/users")
                        .guard(guard::Post())
                        .wrap(Authorize::new("create", "users"))
                        .to(echo_body),
                )
                .service(
                    web::resource("/users/{id}")
                        .guard(guard::Put())
                        .wrap(Authorize::new("update", "users"))
                        .to(probe),
                ),
        )
        .await
    }};
}

async fn post_json<S, B>(
    app: &S,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut request = test::TestRequest::post().uri(path).set_json(body);
    if let Some(token) = token {
        request = request.insert_header(("Authorization", format!("Bearer {token}")));
    }
    test::call_service(app, request.to_request()).await
}

fn register_body(email: &str, role: Option<&str>) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "password": "Abc12345!",
        "confirm_password": "Abc12345!",
        "role": role,
    })
}

/// Register and return `(user, token)` from the session payload
async fn register<S, B>(app: &S, email: &str, role: Option<&str>) -> (Value, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = post_json(app, "/auth/register", None, register_body(email, role)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (body["data"]["user"].clone(), token)
}

#[actix_web::test]
async fn health_endpoint_reports_ok() {
    let app = test_app!();
    let response = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn register_normalizes_email_and_issues_a_working_token() {
    let app = test_app!();
    let (user, token) = register(&app, "  Ada@Example.COM ", None).await;
    assert_eq!(user["email"], json!("ada@example.com"));
    assert!(user.get("secret_hash").is_none());

    // The issued token passes the middleware.
    let response = post_json(&app, "/tasks", Some(&token), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["role"], json!("User"));
    assert_eq!(body["identity"], user["id"]);
}

#[actix_web::test]
async fn register_rejects_password_confirmation_mismatch() {
    let app = test_app!();
    let mut body = register_body("a@x.com", None);
    body["confirm_password"] = json!("Different1!");

    let response = post_json(&app, "/auth/register", None, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[actix_web::test]
async fn register_rejects_duplicate_email() {
    let app = test_app!();
    register(&app, "a@x.com", None).await;

    let response = post_json(&app, "/auth/register", None, register_body("a@x.com", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("EMAIL_EXISTS"));
}

#[actix_web::test]
async fn login_round_trips_and_rejects_wrong_password() {
    let app = test_app!();
    register(&app, "a@x.com", None).await;

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({"email": "a@x.com", "password": "Abc12345!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/auth/login",
        None,
        json!({"email": "a@x.com", "password": "Wrong123!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("INVALID_CREDENTIALS"));
}

#[actix_web::test]
async fn forgot_password_reports_unknown_email() {
    let app = test_app!();
    let response = post_json(
        &app,
        "/auth/forgot_password",
        None,
        json!({"email": "nobody@x.com"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reset_password_rejects_unknown_token() {
    let app = test_app!();
    register(&app, "a@x.com", None).await;

    let response = post_json(
        &app,
        "/auth/reset_password/deadbeef",
        None,
        json!({"password": "NewPass1!", "confirm_password": "NewPass1!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("RESET_TOKEN_INVALID"));
}

#[actix_web::test]
async fn anonymous_read_is_public_but_writes_are_not() {
    let app = test_app!();

    let response = test::call_service(&app, test::TestRequest::get().uri("/tasks").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["role"], json!("Viewer"));
    assert_eq!(body["identity"], Value::Null);

    let response = post_json(&app, "/tasks", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));
}

#[actix_web::test]
async fn garbage_token_is_rejected_as_invalid() {
    let app = test_app!();
    let response = post_json(&app, "/tasks", Some("not-a-jwt"), json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("TOKEN_INVALID"));
}

#[actix_web::test]
async fn user_role_cannot_manage_users() {
    let app = test_app!();
    let (user, token) = register(&app, "a@x.com", None).await;

    let path = format!("/users/{}", user["id"].as_str().unwrap());
    let request = test::TestRequest::put()
        .uri(&path)
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({"first_name": "Eve"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("ACCESS_DENIED"));
}

#[actix_web::test]
async fn admin_cannot_create_a_super_admin() {
    let app = test_app!();
    let (_, admin_token) = register(&app, "admin@x.com", Some("Admin")).await;

    let response = post_json(
        &app,
        "/users",
        Some(&admin_token),
        json!({"email": "new@x.com", "role": "Super Admin"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));
}

#[actix_web::test]
async fn admin_cannot_modify_a_super_admin_account() {
    let app = test_app!();
    let (root, _) = register(&app, "root@x.com", Some("Super Admin")).await;
    let (_, admin_token) = register(&app, "admin@x.com", Some("Admin")).await;

    let path = format!("/users/{}", root["id"].as_str().unwrap());
    let request = test::TestRequest::put()
        .uri(&path)
        .insert_header(("Authorization", format!("Bearer {admin_token}")))
        .set_json(json!({"first_name": "Renamed"}))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_may_create_ordinary_users_and_the_body_survives_the_peek() {
    let app = test_app!();
    let (_, admin_token) = register(&app, "admin@x.com", Some("Admin")).await;

    let payload = json!({"email": "new@x.com", "role": "User"});
    let response = post_json(&app, "/users", Some(&admin_token), payload.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The handler received the same body the middleware inspected.
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, payload);
}

#[actix_web::test]
async fn super_admin_may_assign_the_top_role() {
    let app = test_app!();
    let (_, root_token) = register(&app, "root@x.com", Some("Super Admin")).await;

    let response = post_json(
        &app,
        "/users",
        Some(&root_token),
        json!({"email": "second@x.com", "role": "Super Admin"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
