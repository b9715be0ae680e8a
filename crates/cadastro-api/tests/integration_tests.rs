//! # Integration Tests for cadastro-api
//!
//! Drives the full router (auth middleware included) over the in-memory
//! stores via `tower::ServiceExt::oneshot`: customer lifecycle, address
//! batches, credential validation, token handling, and the 404/405
//! routing contract.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use cadastro_api::auth::SecretString;
use cadastro_api::state::{AppConfig, AppState};
use cadastro_api::token;

const SECRET: &str = "integration-test-secret";

/// Helper: build the test app over the in-memory stores.
fn test_app() -> axum::Router {
    let config = AppConfig {
        port: 8080,
        database_url: None,
        jwt_secret: SecretString::new(SECRET),
        cors_origin: AppConfig::DEFAULT_CORS_ORIGIN.to_string(),
        token_ttl_secs: 3600,
    };
    cadastro_api::app(AppState::new(config))
}

/// Helper: a bearer token accepted by the test app.
fn bearer() -> String {
    let mut claims = token::Claims::new();
    claims.insert("sub".to_string(), json!("integration-tests"));
    format!("Bearer {}", token::encode(&claims, SECRET.as_bytes(), 60))
}

/// Helper: an authenticated JSON request.
fn authed(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Helper: read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn customer_body(email: &str) -> Value {
    json!({
        "name": "Roberto Almeida",
        "email": email,
        "birthday": "1987-04-12",
        "cpf": "123.456.789-00",
        "rg": "12.345.678-9",
        "phone": "+55 11 98888-7777"
    })
}

// -- Public surface -----------------------------------------------------------

#[tokio::test]
async fn root_announces_the_application() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Application is Running"})
    );
}

#[tokio::test]
async fn health_probes_answer_without_credentials() {
    for uri in ["/health/liveness", "/health/readiness"] {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/customer"].is_object());
}

// -- Authentication middleware ------------------------------------------------

#[tokio::test]
async fn missing_token_is_rejected_before_the_handler() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/customer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body["errors"][0],
        json!("Missing or invalid Authorization header")
    );
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let mut token = bearer();
    token.pop();
    token.push('A');

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/customer")
                .header(header::AUTHORIZATION, token)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let expired = format!(
        "Bearer {}",
        token::encode(&token::Claims::new(), SECRET.as_bytes(), -1)
    );

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/customer")
                .header(header::AUTHORIZATION, expired)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0], json!("Unauthorized: Token expired"));
}

#[tokio::test]
async fn valid_token_reaches_the_handler() {
    let response = test_app()
        .oneshot(authed("GET", "/customer", json!(null)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn allowlisted_routes_work_without_a_token() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customer/exists")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "ghost@example.com"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(false));
}

// -- Customer lifecycle -------------------------------------------------------

#[tokio::test]
async fn create_then_list_round_trips_addresses() {
    let app = test_app();

    let mut body = customer_body("roberto@example.com");
    body["addresses"] = json!([
        {"street": "Avenida Paulista", "number": "1578", "zipcode": "01310-200",
         "city": "São Paulo", "state": "SP"},
        {"street": "Rua Harmonia", "number": "7", "zipcode": "05435-000",
         "city": "São Paulo", "state": "SP"}
    ]);

    let response = app
        .clone()
        .oneshot(authed("POST", "/customer", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Customer created successfully"})
    );

    let response = app
        .oneshot(authed("GET", "/customer", json!(null)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let customer = &listed[0];
    assert_eq!(customer["email"], json!("roberto@example.com"));
    assert!(customer.get("password").is_none());

    let addresses = customer["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0]["street"], json!("Avenida Paulista"));
    assert_eq!(addresses[0]["zipcode"], json!("01310-200"));
    assert_eq!(addresses[1]["street"], json!("Rua Harmonia"));
    assert_eq!(addresses[1]["customerId"], customer["id"]);
}

#[tokio::test]
async fn invalid_customer_reports_every_violated_rule() {
    let response = test_app()
        .oneshot(authed(
            "POST",
            "/customer",
            json!({
                "name": "",
                "email": "not-an-email",
                "birthday": "2999-01-01",
                "cpf": "123",
                "rg": "456",
                "phone": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn update_requires_the_email_field() {
    let response = test_app()
        .oneshot(authed(
            "PUT",
            "/customer/1",
            json!({
                "name": "X",
                "birthday": "1990-01-01",
                "cpf": "111.222.333-44",
                "rg": "1.234.567-8",
                "phone": "1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0], json!("Missing required field: email"));
}

#[tokio::test]
async fn update_of_unknown_customer_is_404() {
    let mut body = customer_body("ghost@example.com");
    body["email"] = json!("ghost@example.com");

    let response = test_app()
        .oneshot(authed("PUT", "/customer/99", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_replaces_fields_but_preserves_email() {
    let app = test_app();
    app.clone()
        .oneshot(authed(
            "POST",
            "/customer",
            customer_body("fixa@example.com"),
        ))
        .await
        .unwrap();

    let mut update = customer_body("fixa@example.com");
    update["name"] = json!("Roberto Renamed");

    let response = app
        .clone()
        .oneshot(authed("PUT", "/customer/1", update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(
        app.oneshot(authed("GET", "/customer", json!(null)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed[0]["name"], json!("Roberto Renamed"));
    assert_eq!(listed[0]["email"], json!("fixa@example.com"));
}

#[tokio::test]
async fn delete_cascades_to_addresses() {
    let app = test_app();

    let mut body = customer_body("cascata@example.com");
    body["addresses"] = json!([
        {"street": "Rua Augusta", "number": "100", "zipcode": "01304-000",
         "city": "São Paulo", "state": "SP"}
    ]);
    app.clone()
        .oneshot(authed("POST", "/customer", body))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/customer/1", json!(null)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(
        app.oneshot(authed("GET", "/customer", json!(null)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed, json!([]));
}

// -- Credentials & existence --------------------------------------------------

#[tokio::test]
async fn credentials_validate_against_the_stored_hash() {
    let app = test_app();

    let mut body = customer_body("admin@example.com");
    body["password"] = json!("s3nha-segura");
    app.clone()
        .oneshot(authed("POST", "/customer", body))
        .await
        .unwrap();

    let ok = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customer/credentials")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "admin@example.com", "password": "s3nha-segura"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(body_json(ok).await, json!(true));

    let wrong = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customer/credentials")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "admin@example.com", "password": "errada"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong).await,
        json!({"errors": ["Invalid credentials"]})
    );
}

#[tokio::test]
async fn credentials_without_password_are_a_bad_request() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customer/credentials")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"email": "x@example.com"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"errors": ["Password is required"]})
    );
}

#[tokio::test]
async fn exists_reflects_the_store() {
    let app = test_app();
    app.clone()
        .oneshot(authed("POST", "/customer", customer_body("eva@example.com")))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customer/exists")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"email": "eva@example.com"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(true));
}

// -- Address batches ----------------------------------------------------------

async fn app_with_customer_and_addresses() -> axum::Router {
    let app = test_app();
    let mut body = customer_body("enderecos@example.com");
    body["addresses"] = json!([
        {"street": "Rua A", "number": "1", "zipcode": "01000-001",
         "city": "São Paulo", "state": "SP"},
        {"street": "Rua B", "number": "2", "zipcode": "01000-002",
         "city": "São Paulo", "state": "SP"}
    ]);
    app.clone()
        .oneshot(authed("POST", "/customer", body))
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn empty_address_batch_removes_them_all() {
    let app = app_with_customer_and_addresses().await;

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            "/customer/1/address",
            json!({"addresses": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "All addresses removed successfully"})
    );

    let listed = body_json(
        app.oneshot(authed("GET", "/customer", json!(null)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed[0]["addresses"], json!([]));
}

#[tokio::test]
async fn address_batch_updates_by_id_and_creates_the_rest() {
    let app = app_with_customer_and_addresses().await;

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            "/customer/1/address",
            json!({"addresses": [
                {"id": 1, "street": "Rua A Reformada", "number": "1",
                 "zipcode": "01000-001", "city": "São Paulo", "state": "SP"},
                {"street": "Rua C", "number": "3", "zipcode": "01000-003",
                 "city": "São Paulo", "state": "SP"}
            ]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed = body_json(
        app.oneshot(authed("GET", "/customer", json!(null)))
            .await
            .unwrap(),
    )
    .await;
    let addresses = listed[0]["addresses"].as_array().unwrap();
    assert_eq!(addresses.len(), 3);
    assert!(addresses
        .iter()
        .any(|a| a["street"] == json!("Rua A Reformada")));
    assert!(addresses.iter().any(|a| a["street"] == json!("Rua C")));
}

#[tokio::test]
async fn invalid_address_in_a_batch_is_a_400() {
    let app = app_with_customer_and_addresses().await;

    let response = app
        .oneshot(authed(
            "PUT",
            "/customer/1/address",
            json!({"addresses": [
                {"street": "OK Street", "number": "9", "zipcode": "bogus",
                 "city": "São Paulo", "state": "SP"}
            ]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_removal_is_fail_fast() {
    let app = app_with_customer_and_addresses().await;

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            "/customer/1/address",
            json!({"addressIds": [1, 99]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing was deleted.
    let listed = body_json(
        app.clone()
            .oneshot(authed("GET", "/customer", json!(null)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed[0]["addresses"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(authed(
            "DELETE",
            "/customer/1/address",
            json!({"addressIds": [1, 2]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_address_ids_are_a_400() {
    let response = test_app()
        .oneshot(authed("DELETE", "/customer/1/address", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"errors": ["Invalid or missing addressIds"]})
    );
}

// -- Routing contract ---------------------------------------------------------

#[tokio::test]
async fn unknown_routes_are_a_json_404() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/no/such/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"errors": ["Route Not Found"]})
    );
}

#[tokio::test]
async fn wrong_method_on_a_known_path_is_a_405() {
    let response = test_app()
        .oneshot(authed("PATCH", "/customer", json!(null)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn metrics_expose_request_counters() {
    let app = test_app();
    app.clone()
        .oneshot(authed("GET", "/customer", json!(null)))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}