use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use mailform_core_contact_contracts::{
    ContactFeatureService, ContactSubmitError, ContactTestEmailError, SendStage,
};
use mailform_models::{client::ClientContext, contact::RawSubmission};
use mailform_utils::Apply;
use tracing::debug;

use crate::{
    errors::{
        failure, internal_server_error, rate_limited, validation_failed, AUTO_REPLY_FAILED,
        EMAIL_NOT_CONFIGURED, EMAIL_UNAVAILABLE, NOTIFICATION_FAILED, TEST_EMAIL_FAILED,
    },
    extractors::user_agent::UserAgent,
    middlewares::{client_ip::ClientIp, request_id::RequestId},
    models::contact::{ApiContactReceipt, ApiTestEmailReceipt},
};

pub fn router(service: Arc<impl ContactFeatureService>, test_email: bool) -> Router<()> {
    Router::new()
        .route("/contact", routing::post(submit).fallback(super::not_found))
        .apply_if(test_email, |router| {
            router.route(
                "/test-email",
                routing::post(send_test_email).fallback(super::not_found),
            )
        })
        .with_state(service)
}

async fn submit(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(client_ip): Extension<ClientIp>,
    Extension(request_id): Extension<RequestId>,
    user_agent: UserAgent,
    payload: Result<Json<RawSubmission>, JsonRejection>,
) -> Response {
    let submission = payload.map(|Json(submission)| submission).unwrap_or_else(|err| {
        debug!("treating unreadable body as empty submission: {err}");
        RawSubmission::default()
    });

    let client = ClientContext {
        ip: client_ip.0,
        user_agent: user_agent.0,
    };

    match service.submit(submission, client).await {
        Ok(receipt) => Json(ApiContactReceipt::from(receipt)).into_response(),
        Err(ContactSubmitError::RateLimited { reset_at }) => rate_limited(reset_at),
        Err(ContactSubmitError::ValidationFailed(errors)) => validation_failed(errors),
        Err(ContactSubmitError::ConfigurationMissing) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, EMAIL_NOT_CONFIGURED)
        }
        Err(ContactSubmitError::TransportUnavailable) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, EMAIL_UNAVAILABLE)
        }
        Err(ContactSubmitError::SendFailed(SendStage::Notification)) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, NOTIFICATION_FAILED)
        }
        Err(ContactSubmitError::SendFailed(SendStage::AutoReply)) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, AUTO_REPLY_FAILED)
        }
        Err(ContactSubmitError::Other(err)) => internal_server_error(request_id, err),
    }
}

async fn send_test_email(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(client_ip): Extension<ClientIp>,
    Extension(request_id): Extension<RequestId>,
    user_agent: UserAgent,
) -> Response {
    let client = ClientContext {
        ip: client_ip.0,
        user_agent: user_agent.0,
    };

    match service.send_test_email(client).await {
        Ok(receipt) => Json(ApiTestEmailReceipt::from(receipt)).into_response(),
        Err(ContactTestEmailError::RateLimited { reset_at }) => rate_limited(reset_at),
        Err(ContactTestEmailError::ConfigurationMissing) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, EMAIL_NOT_CONFIGURED)
        }
        Err(ContactTestEmailError::TransportUnavailable) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, EMAIL_UNAVAILABLE)
        }
        Err(ContactTestEmailError::SendFailed) => {
            failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, TEST_EMAIL_FAILED)
        }
        Err(ContactTestEmailError::Other(err)) => internal_server_error(request_id, err),
    }
}
