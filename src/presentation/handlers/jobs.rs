use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Address, AddressKind, BookingDraft, JobId, NewJob, Price, ServiceCategory};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::dto::{JobResponse, job_list};

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub category: String,
    pub service_type: String,
    pub price: f64,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct AddressRequest {
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
pub struct BookingRequest {
    pub category: String,
    pub option_id: Option<String>,
    pub address: AddressRequest,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckoutRequestBody {
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse::<JobId>().map_err(ApiError::bad_request)
}

#[tracing::instrument(skip(state, user, request), fields(client_id = %user.id))]
pub async fn create_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = request
        .category
        .parse::<ServiceCategory>()
        .map_err(ApiError::validation)?;
    let price = Price::from_amount(request.price).map_err(|e| ApiError::validation(e.to_string()))?;

    let new_job = NewJob {
        client_id: user.id,
        category,
        service_type: request.service_type,
        price,
        address: request.address,
        description: request.description,
        scheduled_date: request.scheduled_date,
    };

    let job = state.lifecycle.create(&user, new_job).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

/// Submits a booking drafted against the service catalog.
#[tracing::instrument(skip(state, user, request), fields(client_id = %user.id))]
pub async fn book_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<BookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = request
        .category
        .parse::<ServiceCategory>()
        .map_err(ApiError::validation)?;
    let kind: AddressKind = match request.address.kind.as_deref() {
        Some(raw) => raw.parse().map_err(ApiError::validation)?,
        None => AddressKind::default(),
    };

    let mut draft = BookingDraft::new(category, request.scheduled_date);
    draft.option_id = request.option_id;
    draft.notes = request.notes;
    draft.address = Address {
        street: request.address.street,
        city: request.address.city,
        zip: request.address.zip,
        kind,
    };

    let job = state.lifecycle.book(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

pub async fn list_my_jobs_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.lifecycle.list_for_client(&user, user.id).await?;
    Ok(Json(job_list(&jobs)))
}

pub async fn list_market_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MarketQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state
        .lifecycle
        .list_market(&user, query.filter.as_deref())
        .await?;
    Ok(Json(job_list(&jobs)))
}

pub async fn list_schedule_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.lifecycle.list_schedule(&user).await?;
    Ok(Json(job_list(&jobs)))
}

pub async fn get_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.lifecycle.get(&user, parse_job_id(&job_id)?).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn accept_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.lifecycle.accept(&user, parse_job_id(&job_id)?).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn start_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.lifecycle.start(&user, parse_job_id(&job_id)?).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn complete_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .lifecycle
        .complete(&user, parse_job_id(&job_id)?)
        .await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn cancel_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.lifecycle.cancel(&user, parse_job_id(&job_id)?).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn checkout_job_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
    Json(request): Json<CheckoutRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .lifecycle
        .initiate_payment(
            &user,
            parse_job_id(&job_id)?,
            &request.success_url,
            &request.cancel_url,
        )
        .await?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
    }))
}
