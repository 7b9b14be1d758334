use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use portfolio_core_contact_contracts::{
    ContactFeatureService, ContactListError, ContactSubmitError, ContactSubmitted,
};

use crate::{
    errors::{error, internal_server_error},
    models::contact::{ApiContact, ApiContactSubmitResponse},
};

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(submit))
        .route("/api/contacts", routing::get(list_contacts))
        .with_state(service)
}

async fn submit(
    service: State<Arc<impl ContactFeatureService>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let input = match body {
        Ok(Json(input)) => input,
        Err(rejection) => return error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.submit(input).await {
        Ok(ContactSubmitted {
            contact,
            notification,
        }) => (
            StatusCode::CREATED,
            Json(ApiContactSubmitResponse {
                message: "Message sent successfully",
                contact: contact.into(),
                email_sent: notification.is_delivered(),
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Validation(err)) => error(StatusCode::BAD_REQUEST, err.to_string()),
        Err(ContactSubmitError::Other(err)) => internal_server_error(err, "Failed to send message"),
    }
}

async fn list_contacts(service: State<Arc<impl ContactFeatureService>>) -> Response {
    match service.list_contacts().await {
        Ok(contacts) => Json(
            contacts
                .into_iter()
                .map(ApiContact::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(ContactListError::Other(err)) => {
            internal_server_error(err, "Failed to retrieve contacts")
        }
    }
}
