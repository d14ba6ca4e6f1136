use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::applications::ApplicationSubmission;
use super::dispatch::PublishQueue;
use super::domain::{AdvertId, AdvertUpdate, NewAdvert, Viewer};
use super::repository::{AdvertRepository, ApplicationRepository, StoreError};
use super::service::{AdvertService, AdvertServiceError};
use crate::identity::router::token_from_headers;
use crate::identity::service::Authenticator;
use crate::pagination::{paginate, PageParams};

/// Shared state for the advert endpoints: the lifecycle service, a token
/// authenticator, and the default page size for list responses.
pub struct AdvertRouterState<R, Q> {
    pub service: Arc<AdvertService<R, Q>>,
    pub authenticator: Arc<dyn Authenticator>,
    pub page_size: usize,
}

impl<R, Q> Clone for AdvertRouterState<R, Q> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            authenticator: self.authenticator.clone(),
            page_size: self.page_size,
        }
    }
}

/// Schedule payload: the instant the advert should go live.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub date_time: DateTime<Utc>,
}

/// Router builder exposing the advert lifecycle endpoints.
pub fn advert_router<R, Q>(state: AdvertRouterState<R, Q>) -> Router
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    Router::new()
        .route(
            "/api/v1/adverts",
            post(create_handler::<R, Q>).get(list_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id",
            get(retrieve_handler::<R, Q>)
                .patch(update_handler::<R, Q>)
                .delete(delete_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id/publish",
            post(publish_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id/unpublish",
            post(unpublish_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id/apply",
            post(apply_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id/applications",
            get(applications_handler::<R, Q>),
        )
        .route(
            "/api/v1/adverts/:advert_id/schedule",
            post(schedule_handler::<R, Q>),
        )
        .with_state(state)
}

fn viewer_for(authenticator: &Arc<dyn Authenticator>, headers: &HeaderMap) -> Viewer {
    match token_from_headers(headers).and_then(|token| authenticator.account_for_token(token)) {
        Some(_) => Viewer::Authenticated,
        None => Viewer::Anonymous,
    }
}

/// Resolve the caller's account or answer 401.
fn require_account(
    authenticator: &Arc<dyn Authenticator>,
    headers: &HeaderMap,
) -> Result<(), Response> {
    let Some(token) = token_from_headers(headers) else {
        return Err(unauthorized("Authentication required"));
    };
    match authenticator.account_for_token(token) {
        Some(_) => Ok(()),
        None => Err(unauthorized("Invalid token")),
    }
}

pub(crate) async fn create_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    headers: HeaderMap,
    axum::Json(payload): axum::Json<NewAdvert>,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.create(payload) {
        Ok(advert) => (StatusCode::CREATED, axum::Json(advert)).into_response(),
        Err(AdvertServiceError::Validation(error)) => error.into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn list_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Query(params): Query<PageParams>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    let viewer = viewer_for(&state.authenticator, &headers);
    match state.service.list(viewer) {
        Ok(views) => {
            let page = paginate(views, params, state.page_size);
            (StatusCode::OK, axum::Json(page)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn retrieve_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    let viewer = viewer_for(&state.authenticator, &headers);
    match state.service.retrieve(&AdvertId(advert_id), viewer) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn update_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<AdvertUpdate>,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.update(&AdvertId(advert_id), update) {
        Ok(advert) => (StatusCode::OK, axum::Json(advert)).into_response(),
        Err(AdvertServiceError::Validation(error)) => error.into_response(),
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn delete_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.delete(&AdvertId(advert_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(AdvertServiceError::Store(StoreError::StillPublished)) => {
            business_rule("Only unpublished adverts can be deleted.")
        }
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn publish_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.publish(&AdvertId(advert_id)) {
        Ok(_) => message_response("Advert published."),
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn unpublish_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.unpublish(&AdvertId(advert_id)) {
        Ok(_) => message_response("Advert unpublished."),
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn apply_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    match state.service.apply(&AdvertId(advert_id), submission) {
        Ok(_) => message_response("Applied Successfully."),
        Err(AdvertServiceError::Validation(error)) => error.into_response(),
        Err(AdvertServiceError::Store(StoreError::NotPublished)) => {
            business_rule("You can only apply for a published advert.")
        }
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn applications_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    Query(params): Query<PageParams>,
    headers: HeaderMap,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state.service.applications(&AdvertId(advert_id)) {
        Ok(applications) => {
            let page = paginate(applications, params, state.page_size);
            (StatusCode::OK, axum::Json(page)).into_response()
        }
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn schedule_handler<R, Q>(
    State(state): State<AdvertRouterState<R, Q>>,
    Path(advert_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ScheduleRequest>,
) -> Response
where
    R: AdvertRepository + ApplicationRepository + 'static,
    Q: PublishQueue + 'static,
{
    if let Err(response) = require_account(&state.authenticator, &headers) {
        return response;
    }

    match state
        .service
        .schedule_publish(&AdvertId(advert_id), request.date_time)
    {
        Ok(_) => message_response("Scheduled successfully."),
        Err(AdvertServiceError::Store(StoreError::StillPublished)) => {
            business_rule("You can only schedule an unpublished advert.")
        }
        Err(AdvertServiceError::Store(StoreError::NotFound)) => not_found(),
        Err(other) => internal_error(other),
    }
}

fn message_response(message: &str) -> Response {
    (StatusCode::OK, axum::Json(json!({ "message": message }))).into_response()
}

fn business_rule(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, axum::Json(json!({ "error": "Not found." }))).into_response()
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, axum::Json(json!({ "error": message }))).into_response()
}

fn internal_error(error: AdvertServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
