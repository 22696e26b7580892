//! # Request Handlers
//!
//! Axum request handlers for the summary API.
//! Builds a cart from the request body and renders its summary.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use summary_core::{
    Cart, Product, RenderedSummary, SummaryError, Voucher, MAX_PERCENT, MAX_PRICE, MAX_QUANTITY,
};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Summarize request
#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    /// Line items, in display order
    #[serde(default)]
    pub items: Vec<SummaryItem>,
    /// Percent-off vouchers
    #[serde(default)]
    pub vouchers: Vec<VoucherRequest>,
}

/// Item in summarize request
#[derive(Debug, Deserialize)]
pub struct SummaryItem {
    /// Product ID
    pub product_id: String,
    /// Product name (optional, for display)
    #[serde(default)]
    pub name: Option<String>,
    /// Unit price
    pub unit_price: Decimal,
    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Voucher in summarize request
#[derive(Debug, Deserialize)]
pub struct VoucherRequest {
    pub code: String,
    pub percent: Decimal,
}

/// Extra declaration as exposed by `GET /api/v1/extras`.
///
/// Fields that depend on the cart are reported as `null`.
#[derive(Debug, Serialize)]
pub struct ExtraInfo {
    pub key: String,
    pub position: usize,
    pub verbose_name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub included: Option<bool>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn summary_error_to_response(err: SummaryError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let Some(source) = std::error::Error::source(&err) {
        response = response.with_details(source.to_string());
    }
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

impl SummaryRequest {
    /// Validate the request and turn it into a cart
    pub fn into_cart(self) -> Result<Cart, SummaryError> {
        let mut cart = Cart::new(0);

        for item in self.items {
            if item.product_id.trim().is_empty() {
                return Err(SummaryError::InvalidRequest("product_id must not be empty".to_string()));
            }
            if item.quantity == 0 || item.quantity > MAX_QUANTITY {
                return Err(SummaryError::InvalidRequest(format!(
                    "Quantity for {} must be between 1 and {}, got {}",
                    item.product_id, MAX_QUANTITY, item.quantity
                )));
            }
            if item.unit_price.is_sign_negative() && !item.unit_price.is_zero() {
                return Err(SummaryError::InvalidRequest(format!(
                    "Negative unit price for {}",
                    item.product_id
                )));
            }
            if item.unit_price > MAX_PRICE {
                return Err(SummaryError::InvalidRequest(format!(
                    "Unit price for {} exceeds maximum allowed ({}), got {}",
                    item.product_id, MAX_PRICE, item.unit_price
                )));
            }

            let name = item.name.unwrap_or_default();
            cart.add_product(Product::new(item.product_id, name, item.unit_price), item.quantity);
        }

        for voucher in self.vouchers {
            if voucher.percent.is_sign_negative() && !voucher.percent.is_zero() {
                return Err(SummaryError::InvalidRequest(format!(
                    "Negative percent for voucher {}",
                    voucher.code
                )));
            }
            if voucher.percent > MAX_PERCENT {
                return Err(SummaryError::InvalidRequest(format!(
                    "Percent for voucher {} exceeds maximum allowed ({}), got {}",
                    voucher.code, MAX_PERCENT, voucher.percent
                )));
            }
            cart.add_voucher(Voucher::new(voucher.code, voucher.percent));
        }

        Ok(cart)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cart-summary",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List the configured extras in summary order
#[instrument(skip(state))]
pub async fn list_extras(State(state): State<AppState>) -> impl IntoResponse {
    let extras: Vec<ExtraInfo> = state
        .definition
        .registry()
        .iter()
        .enumerate()
        .map(|(position, extra)| ExtraInfo {
            key: extra.key().to_string(),
            position,
            verbose_name: extra.literal_verbose_name(),
            description: extra.literal_description(),
            amount: extra.amount_field().and_then(|f| f.as_literal()).copied(),
            included: extra.literal_included(),
        })
        .collect();

    Json(serde_json::json!({
        "summary": state.definition.name(),
        "extras": extras,
        "count": extras.len()
    }))
}

/// Render the summary of the cart described by the request
#[instrument(skip(state, request), fields(items = request.items.len(), vouchers = request.vouchers.len()))]
pub async fn create_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<RenderedSummary>, (StatusCode, Json<ErrorResponse>)> {
    let cart = request.into_cart().map_err(summary_error_to_response)?;

    let rendered = state
        .definition
        .summarize(&cart)
        .render()
        .map_err(|e| {
            error!("Failed to render summary: {}", e);
            summary_error_to_response(e)
        })?;

    info!(
        total = %rendered.total,
        amount_due = %rendered.amount_due,
        "Rendered summary"
    );

    Ok(Json(rendered))
}
