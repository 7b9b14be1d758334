use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use portfolio_api_rest::RestServer;
use portfolio_core_contact_contracts::{
    notification::NotificationOutcome, ContactListError, ContactSubmitError, ContactSubmitted,
    MockContactFeatureService,
};
use portfolio_core_health_contracts::{HealthStatus, MockHealthFeatureService};
use portfolio_demo::contact::{submission_json, BAR, FOO, FOO_SUBMISSION};
use portfolio_models::schema::CONTACT_SCHEMA;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(health: MockHealthFeatureService, contact: MockContactFeatureService) -> Router {
    RestServer::new(health, contact).router()
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn foo_json() -> Value {
    json!({
        "id": 1,
        "name": "Al",
        "email": "a@b.com",
        "subject": "Hello there",
        "message": "This is a test message.",
        "createdAt": "2024-03-14T13:37:42Z",
    })
}

#[tokio::test]
async fn submit_created() {
    // Arrange
    let input = submission_json(&FOO_SUBMISSION);
    let contact = MockContactFeatureService::new().with_submit(
        input.clone(),
        Ok(ContactSubmitted {
            contact: FOO.clone(),
            notification: NotificationOutcome::Delivered("250 Ok".into()),
        }),
    );
    let sut = router(MockHealthFeatureService::new(), contact);

    // Act
    let response = sut
        .oneshot(post_json("/api/contact", input.to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("X-Request-Id"));
    assert_eq!(
        json_body(response).await,
        json!({
            "message": "Message sent successfully",
            "contact": foo_json(),
            "emailSent": true,
        })
    );
}

#[tokio::test]
async fn submit_notification_failed() {
    // Arrange
    let input = submission_json(&FOO_SUBMISSION);
    let contact = MockContactFeatureService::new().with_submit(
        input.clone(),
        Ok(ContactSubmitted {
            contact: FOO.clone(),
            notification: NotificationOutcome::Failed,
        }),
    );
    let sut = router(MockHealthFeatureService::new(), contact);

    // Act
    let response = sut
        .oneshot(post_json("/api/contact", input.to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["emailSent"], json!(false));
}

#[tokio::test]
async fn submit_invalid() {
    // Arrange
    let input = json!({"name": "A", "email": "a@b.com", "subject": "Hi", "message": "short"});
    let err = CONTACT_SCHEMA.validate(&input).unwrap_err();
    let expected = err.to_string();
    let contact = MockContactFeatureService::new()
        .with_submit(input.clone(), Err(ContactSubmitError::Validation(err)));
    let sut = router(MockHealthFeatureService::new(), contact);

    // Act
    let response = sut
        .oneshot(post_json("/api/contact", input.to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"message": expected}));
}

#[tokio::test]
async fn submit_malformed_json() {
    let sut = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    let response = sut
        .oneshot(post_json("/api/contact", "{\"name\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn submit_store_failed() {
    // Arrange
    let input = submission_json(&FOO_SUBMISSION);
    let contact = MockContactFeatureService::new().with_submit(
        input.clone(),
        Err(ContactSubmitError::Other(anyhow::anyhow!("disk full"))),
    );
    let sut = router(MockHealthFeatureService::new(), contact);

    // Act
    let response = sut
        .oneshot(post_json("/api/contact", input.to_string()))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Failed to send message"})
    );
}

#[tokio::test]
async fn list_contacts() {
    // Arrange
    let contact =
        MockContactFeatureService::new().with_list_contacts(Ok(vec![FOO.clone(), BAR.clone()]));
    let sut = router(MockHealthFeatureService::new(), contact);

    // Act
    let response = sut
        .oneshot(Request::get("/api/contacts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body[0], foo_json());
    assert_eq!(body[1]["id"], json!(2));
    assert_eq!(body[1]["createdAt"], json!("2024-04-07T10:23:00Z"));
}

#[tokio::test]
async fn list_contacts_failed() {
    let contact = MockContactFeatureService::new()
        .with_list_contacts(Err(ContactListError::Other(anyhow::anyhow!("gone"))));
    let sut = router(MockHealthFeatureService::new(), contact);

    let response = sut
        .oneshot(Request::get("/api/contacts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Failed to retrieve contacts"})
    );
}

#[tokio::test]
async fn health() {
    // Arrange
    let health = MockHealthFeatureService::new().with_get_status(HealthStatus {
        database: true,
        email: None,
    });
    let sut = router(health, MockContactFeatureService::new());

    // Act
    let response = sut
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"http": true, "database": true, "email": null})
    );
}

#[tokio::test]
async fn health_unhealthy() {
    let health = MockHealthFeatureService::new().with_get_status(HealthStatus {
        database: true,
        email: Some(false),
    });
    let sut = router(health, MockContactFeatureService::new());

    let response = sut
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn cors_mirrors_origin() {
    // Arrange
    let sut = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );
    let request = Request::options("/api/contact")
        .header(header::ORIGIN, "https://portfolio.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    // Act
    let response = sut.oneshot(request).await.unwrap();

    // Assert
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://portfolio.example"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
