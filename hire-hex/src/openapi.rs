//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use hire_types::domain::{
    AccountId, ContractId, Currency, EntryKind, EntryStatus, HireContract, HireStats, HireStatus,
    LedgerEntry, LedgerEntryId, Money, PlayerStats, Rating, Review, ReviewId, StatsPeriod,
};
use hire_types::dto::{
    AccountResponse, BookHireRequest, CancellationReceipt, ConfirmPaymentRequest, ContractView,
    CreateAccountRequest, HireReceipt, HireRole, PaymentReasonRequest, SubmitReviewRequest,
    TopUpRequest, WithdrawRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::inbound::ACCOUNT_HEADER;

// Dummy functions to generate path documentation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Open a wallet
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Wallet opened", body = AccountResponse),
        (status = 400, description = "Empty or taken username")
    )
)]
async fn create_account() {}

/// Get a wallet by ID
#[utoipa::path(
    get,
    path = "/api/accounts/{id}",
    tag = "accounts",
    params(("id" = AccountId, Path, description = "Account ID (UUID)")),
    responses(
        (status = 200, description = "Wallet details", body = AccountResponse),
        (status = 404, description = "Account not found")
    )
)]
async fn get_account() {}

/// Get a wallet by username
#[utoipa::path(
    get,
    path = "/api/accounts/by-username/{username}",
    tag = "accounts",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Wallet details", body = AccountResponse),
        (status = 404, description = "Account not found")
    )
)]
async fn get_account_by_username() {}

/// Payments owned by an account, newest first
#[utoipa::path(
    get,
    path = "/api/accounts/{id}/payments",
    tag = "payments",
    params(
        ("id" = AccountId, Path, description = "Account ID (UUID)"),
        ("status" = Option<EntryStatus>, Query, description = "Filter by status"),
        ("kind" = Option<EntryKind>, Query, description = "Filter by kind"),
        ("from" = Option<String>, Query, description = "Created at or after (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Created at or before (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<LedgerEntry>),
        (status = 404, description = "Account not found")
    )
)]
async fn list_account_payments() {}

/// Hire history of an account, newest first
#[utoipa::path(
    get,
    path = "/api/accounts/{id}/hires",
    tag = "hires",
    params(
        ("id" = AccountId, Path, description = "Account ID (UUID)"),
        ("role" = Option<HireRole>, Query, description = "hirer (default) or player")
    ),
    responses(
        (status = 200, description = "Contracts", body = Vec<ContractView>),
        (status = 404, description = "Account not found")
    )
)]
async fn list_account_hires() {}

/// Credit a wallet from an external gateway
#[utoipa::path(
    post,
    path = "/api/wallet/top-up",
    tag = "wallet",
    request_body = TopUpRequest,
    security(("account_id" = [])),
    responses(
        (status = 200, description = "Top-up completed", body = LedgerEntry),
        (status = 400, description = "Invalid amount"),
        (status = 403, description = "Not the caller's wallet")
    )
)]
async fn top_up() {}

/// Record a top-up awaiting gateway confirmation
#[utoipa::path(
    post,
    path = "/api/wallet/top-up/pending",
    tag = "wallet",
    request_body = TopUpRequest,
    security(("account_id" = [])),
    responses(
        (status = 202, description = "Top-up pending", body = LedgerEntry),
        (status = 400, description = "Invalid amount"),
        (status = 403, description = "Not the caller's wallet")
    )
)]
async fn request_top_up() {}

/// Move funds out of a wallet
#[utoipa::path(
    post,
    path = "/api/wallet/withdraw",
    tag = "wallet",
    request_body = WithdrawRequest,
    security(("account_id" = [])),
    responses(
        (status = 200, description = "Withdrawal completed", body = LedgerEntry),
        (status = 403, description = "Not the caller's wallet"),
        (status = 422, description = "Insufficient funds")
    )
)]
async fn withdraw() {}

/// Search the ledger
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "payments",
    params(
        ("status" = Option<EntryStatus>, Query, description = "Filter by status"),
        ("kind" = Option<EntryKind>, Query, description = "Filter by kind"),
        ("from" = Option<String>, Query, description = "Created at or after (RFC 3339)"),
        ("to" = Option<String>, Query, description = "Created at or before (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = Vec<LedgerEntry>),
        (status = 400, description = "from is after to")
    )
)]
async fn search_payments() {}

/// Confirm a pending payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/confirm",
    tag = "payments",
    request_body = ConfirmPaymentRequest,
    params(("id" = LedgerEntryId, Path, description = "Ledger entry ID (UUID)")),
    responses(
        (status = 200, description = "Payment completed", body = LedgerEntry),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not pending")
    )
)]
async fn confirm_payment() {}

/// Fail a pending payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/fail",
    tag = "payments",
    request_body = PaymentReasonRequest,
    params(("id" = LedgerEntryId, Path, description = "Ledger entry ID (UUID)")),
    responses(
        (status = 200, description = "Payment failed", body = LedgerEntry),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not pending")
    )
)]
async fn fail_payment() {}

/// Refund a completed top-up or withdrawal
#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "payments",
    request_body = PaymentReasonRequest,
    params(("id" = LedgerEntryId, Path, description = "Ledger entry ID (UUID)")),
    responses(
        (status = 200, description = "Payment refunded", body = LedgerEntry),
        (status = 400, description = "Hire payments are refunded by canceling the hire"),
        (status = 409, description = "Payment is not completed"),
        (status = 422, description = "Funds already spent")
    )
)]
async fn refund_payment() {}

/// Book a player
#[utoipa::path(
    post,
    path = "/api/hires",
    tag = "hires",
    request_body = BookHireRequest,
    security(("account_id" = [])),
    responses(
        (status = 201, description = "Hire booked and paid", body = HireReceipt),
        (status = 400, description = "Invalid amount or window"),
        (status = 409, description = "Player unavailable"),
        (status = 422, description = "Insufficient funds")
    )
)]
async fn book_hire() {}

/// Get a hire contract
#[utoipa::path(
    get,
    path = "/api/hires/{id}",
    tag = "hires",
    params(("id" = ContractId, Path, description = "Contract ID (UUID)")),
    responses(
        (status = 200, description = "Contract with effective status", body = ContractView),
        (status = 404, description = "Contract not found")
    )
)]
async fn get_hire() {}

/// Cancel a hire before it starts
#[utoipa::path(
    post,
    path = "/api/hires/{id}/cancel",
    tag = "hires",
    security(("account_id" = [])),
    params(("id" = ContractId, Path, description = "Contract ID (UUID)")),
    responses(
        (status = 200, description = "Hire canceled and refunded", body = CancellationReceipt),
        (status = 403, description = "Only the hirer may cancel"),
        (status = 409, description = "Not active or already started"),
        (status = 422, description = "Player can no longer return the funds")
    )
)]
async fn cancel_hire() {}

/// Review a finished hire
#[utoipa::path(
    post,
    path = "/api/hires/{id}/review",
    tag = "reviews",
    request_body = SubmitReviewRequest,
    security(("account_id" = [])),
    params(("id" = ContractId, Path, description = "Contract ID (UUID)")),
    responses(
        (status = 201, description = "Review stored", body = Review),
        (status = 400, description = "Rating outside 0..=5"),
        (status = 403, description = "Only the hirer may review"),
        (status = 409, description = "Not ended or already reviewed")
    )
)]
async fn submit_review() {}

/// Player statistics
#[utoipa::path(
    get,
    path = "/api/players/{id}/stats",
    tag = "reviews",
    params(
        ("id" = AccountId, Path, description = "Player account ID (UUID)"),
        ("period" = Option<StatsPeriod>, Query, description = "day (default), month or year")
    ),
    responses(
        (status = 200, description = "Aggregated statistics", body = PlayerStats),
        (status = 404, description = "Player not found")
    )
)]
async fn player_stats() {}

/// Reviews received by a player, newest first
#[utoipa::path(
    get,
    path = "/api/players/{id}/reviews",
    tag = "reviews",
    params(("id" = AccountId, Path, description = "Player account ID (UUID)")),
    responses(
        (status = 200, description = "Reviews", body = Vec<Review>),
        (status = 404, description = "Player not found")
    )
)]
async fn player_reviews() {}

/// OpenAPI documentation for the hire marketplace API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hire Marketplace Wallet API",
        version = "1.0.0",
        description = "Wallets, an append-only payment ledger and time-boxed player hires.\n\n## Identity\n\nEndpoints that act on behalf of a user read the caller's wallet id from the `X-Account-Id` header, set by the authenticating gateway in front of this service.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_account,
        get_account,
        get_account_by_username,
        list_account_payments,
        list_account_hires,
        top_up,
        request_top_up,
        withdraw,
        search_payments,
        confirm_payment,
        fail_payment,
        refund_payment,
        book_hire,
        get_hire,
        cancel_hire,
        submit_review,
        player_stats,
        player_reviews,
    ),
    components(
        schemas(
            CreateAccountRequest,
            AccountResponse,
            TopUpRequest,
            WithdrawRequest,
            ConfirmPaymentRequest,
            PaymentReasonRequest,
            BookHireRequest,
            SubmitReviewRequest,
            HireReceipt,
            CancellationReceipt,
            ContractView,
            HireContract,
            HireStatus,
            HireRole,
            LedgerEntry,
            EntryKind,
            EntryStatus,
            Money,
            Currency,
            Review,
            Rating,
            PlayerStats,
            HireStats,
            StatsPeriod,
            AccountId,
            ContractId,
            LedgerEntryId,
            ReviewId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Wallet registration and lookup"),
        (name = "wallet", description = "Top-ups and withdrawals"),
        (name = "payments", description = "Payment lifecycle and ledger queries"),
        (name = "hires", description = "Booking, cancellation and hire history"),
        (name = "reviews", description = "Reviews and player statistics"),
    )
)]
pub struct ApiDoc;

/// Declares the caller identity header.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "account_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ACCOUNT_HEADER))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert_eq!(paths.len(), 19);
        assert!(paths.contains_key("/api/hires/{id}/cancel"));
        assert!(paths.contains_key("/api/accounts/by-username/{username}"));
    }
}
