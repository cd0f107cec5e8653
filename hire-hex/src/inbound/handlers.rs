//! HTTP request handlers.

use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use hire_types::{
    AccountId, AccountRef, AccountResponse, AppError, BookHireRequest, ConfirmPaymentRequest,
    ContractId, CreateAccountRequest, DomainError, HireHistoryQuery, LedgerEntryId,
    MarketRepository, PaymentFilter, PaymentReasonRequest, StatsQuery, SubmitReviewRequest,
    TopUpRequest, WithdrawRequest,
};

use super::requester::Requester;
use crate::MarketService;

/// Application state shared across handlers.
pub struct AppState<R: MarketRepository> {
    pub service: MarketService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Rejected(e) => match e {
                DomainError::InvalidAmount
                | DomainError::InvalidTimeRange
                | DomainError::TimeInPast
                | DomainError::InvalidRating(_)
                | DomainError::CurrencyMismatch { .. }
                | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Forbidden => StatusCode::FORBIDDEN,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::PlayerUnavailable
                | DomainError::NotActive
                | DomainError::AlreadyStarted
                | DomainError::ContractNotEnded
                | DomainError::AlreadyReviewed
                | DomainError::IdempotencyKeyReused
                | DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
                DomainError::InsufficientFunds { .. }
                | DomainError::PlayerInsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, Json(body)).into_response()
    }
}

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(DomainError::Validation(format!("Invalid {what} ID")).into()))
}

/// Callers may only move their own funds.
fn ensure_owner(requester: Requester, account_id: AccountId) -> Result<(), ApiError> {
    if requester.0 != account_id {
        return Err(ApiError(DomainError::Forbidden.into()));
    }
    Ok(())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn create_account<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.service.create_account(req).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

#[tracing::instrument(skip(state), fields(account_id = %id))]
pub async fn get_account<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let account_id: AccountId = parse_id(&id, "account")?;
    let account = state.service.get_account(account_id).await?;
    Ok(Json(AccountResponse::from(account)))
}

#[tracing::instrument(skip(state))]
pub async fn get_account_by_username<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .service
        .find_account(AccountRef::Username(username))
        .await?;
    Ok(Json(AccountResponse::from(account)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(account_id = %req.account_id, amount = req.amount))]
pub async fn top_up<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    requester: Requester,
    Json(req): Json<TopUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_owner(requester, req.account_id)?;
    let entry = state.service.top_up(req).await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state, req), fields(account_id = %req.account_id, amount = req.amount))]
pub async fn request_top_up<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    requester: Requester,
    Json(req): Json<TopUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_owner(requester, req.account_id)?;
    let entry = state.service.request_top_up(req).await?;
    Ok((StatusCode::ACCEPTED, Json(entry)))
}

#[tracing::instrument(skip(state, req), fields(account_id = %req.account_id, amount = req.amount))]
pub async fn withdraw<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    requester: Requester,
    Json(req): Json<WithdrawRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_owner(requester, req.account_id)?;
    let entry = state.service.withdraw(req).await?;
    Ok(Json(entry))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments (gateway callbacks and listings)
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(payment_id = %id))]
pub async fn confirm_payment<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_id: LedgerEntryId = parse_id(&id, "payment")?;
    let entry = state
        .service
        .confirm_payment(entry_id, Some(req.external_ref))
        .await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state, req), fields(payment_id = %id))]
pub async fn fail_payment<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentReasonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_id: LedgerEntryId = parse_id(&id, "payment")?;
    let entry = state.service.fail_payment(entry_id, req.reason).await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state, req), fields(payment_id = %id))]
pub async fn refund_payment<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentReasonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry_id: LedgerEntryId = parse_id(&id, "payment")?;
    let entry = state.service.refund_payment(entry_id, req.reason).await?;
    Ok(Json(entry))
}

#[tracing::instrument(skip(state))]
pub async fn search_payments<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Query(filter): Query<PaymentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.service.search_payments(filter).await?;
    Ok(Json(entries))
}

#[tracing::instrument(skip(state), fields(account_id = %id))]
pub async fn list_account_payments<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(filter): Query<PaymentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let account_id: AccountId = parse_id(&id, "account")?;
    let entries = state
        .service
        .payments_for_account_matching(account_id, filter)
        .await?;
    Ok(Json(entries))
}

// ─────────────────────────────────────────────────────────────────────────────
// Hires
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(player_id = %req.player_id, amount = req.amount))]
pub async fn book_hire<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Requester(hirer): Requester,
    Json(req): Json<BookHireRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state.service.book_hire(hirer, req).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[tracing::instrument(skip(state), fields(contract_id = %id))]
pub async fn get_hire<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contract_id: ContractId = parse_id(&id, "contract")?;
    let view = state.service.get_contract(contract_id).await?;
    Ok(Json(view))
}

#[tracing::instrument(skip(state), fields(contract_id = %id))]
pub async fn cancel_hire<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Requester(requester): Requester,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contract_id: ContractId = parse_id(&id, "contract")?;
    let receipt = state.service.cancel_hire(contract_id, requester).await?;
    Ok(Json(receipt))
}

#[tracing::instrument(skip(state, req), fields(contract_id = %id))]
pub async fn submit_review<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Requester(reviewer): Requester,
    Path(id): Path<String>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let contract_id: ContractId = parse_id(&id, "contract")?;
    let review = state
        .service
        .submit_review(contract_id, reviewer, req)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[tracing::instrument(skip(state), fields(account_id = %id))]
pub async fn list_account_hires<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<HireHistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let account_id: AccountId = parse_id(&id, "account")?;
    let hires = state.service.hire_history(account_id, query.role).await?;
    Ok(Json(hires))
}

// ─────────────────────────────────────────────────────────────────────────────
// Players
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state), fields(player_id = %id))]
pub async fn player_stats<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let player_id: AccountId = parse_id(&id, "player")?;
    let stats = state
        .service
        .get_player_stats(player_id, query.period)
        .await?;
    Ok(Json(stats))
}

#[tracing::instrument(skip(state), fields(player_id = %id))]
pub async fn player_reviews<R: MarketRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let player_id: AccountId = parse_id(&id, "player")?;
    let reviews = state.service.list_reviews_for_player(player_id).await?;
    Ok(Json(reviews))
}
