//! # Booking Backend
//!
//! The quote, voucher and booking services behind one HTTP base URL.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backend Request Flow                              │
//! │                                                                         │
//! │  caller ──► HttpBackend::post(path, body)                              │
//! │                 │                                                       │
//! │                 ├── no response (refused, timeout) ──► Communication   │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │            status 2xx ──► decode body ──► core type                     │
//! │                 │              └── malformed ──► Decode                │
//! │                 │                                                       │
//! │                 ├── 4xx on /validate-voucher ──► Rejected{error}        │
//! │                 │                                                       │
//! │                 └── otherwise ──► Service{status, error | generic}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`BookingBackend`] is the seam the presentation layer depends on, so
//! commands can be driven by a scripted backend in tests.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use ridebook_core::types::{
    BookingConfirmation, BookingRequest, Quote, TripRequest, VoucherOutcome,
};
use ridebook_core::Money;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

use crate::config::BackendSettings;
use crate::error::{ClientError, ClientResult, GENERIC_SERVICE_MESSAGE};
use crate::wire::{
    BookingRequestBody, BookingResponseBody, ErrorBody, QuoteRequestBody, QuoteResponseBody,
    VoucherRequestBody, VoucherResponseBody,
};

pub const CALCULATE_BUDGET_PATH: &str = "calculate-budget";
pub const VALIDATE_VOUCHER_PATH: &str = "validate-voucher";
pub const SUBMIT_BOOKING_PATH: &str = "submit-booking";

// =============================================================================
// Backend Trait
// =============================================================================

/// Everything the booking flow asks of the backend.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// Prices a trip. The returned quote carries the request's trip fields.
    async fn calculate_budget(&self, trip: &TripRequest) -> ClientResult<Quote>;

    /// Checks a voucher against a quote's pre-VAT price.
    ///
    /// A rejected code is `Ok(VoucherOutcome::Rejected)`, not an error.
    async fn validate_voucher(
        &self,
        code: &str,
        original_pre_vat: Money,
    ) -> ClientResult<VoucherOutcome>;

    /// Submits a booking.
    async fn submit_booking(&self, request: &BookingRequest) -> ClientResult<BookingConfirmation>;
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// [`BookingBackend`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpBackend {
    /// Builds a client for the configured base URL and timeout.
    pub fn new(settings: &BackendSettings) -> ClientResult<Self> {
        let mut base_url = Url::parse(&settings.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(HttpBackend {
            http,
            base_url,
            auth_token: settings.auth_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<Response> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .map_err(|e| ClientError::Communication(e.to_string()))
    }
}

#[async_trait]
impl BookingBackend for HttpBackend {
    #[tracing::instrument(skip(self, trip), fields(pickup = %trip.pickup, dropoff = %trip.dropoff))]
    async fn calculate_budget(&self, trip: &TripRequest) -> ClientResult<Quote> {
        let body = QuoteRequestBody {
            pickup_location: &trip.pickup,
            dropoff_location: &trip.dropoff,
            passengers: trip.passengers,
            bags: trip.bags,
        };

        let response = self.post(CALCULATE_BUDGET_PATH, &body).await?;
        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let body: QuoteResponseBody = decode(response).await?;
        let quote = Quote::new(trip.clone(), body.into());
        info!(
            pre_vat = %quote.original_pre_vat,
            duration_minutes = quote.duration_minutes,
            "Budget calculated"
        );
        Ok(quote)
    }

    #[tracing::instrument(skip(self, original_pre_vat), fields(original_pre_vat = %original_pre_vat))]
    async fn validate_voucher(
        &self,
        code: &str,
        original_pre_vat: Money,
    ) -> ClientResult<VoucherOutcome> {
        let body = VoucherRequestBody {
            voucher_code: code,
            original_budget_pre_vat: original_pre_vat.amount(),
        };

        let response = self.post(VALIDATE_VOUCHER_PATH, &body).await?;
        let status = response.status();

        if status.is_success() {
            let body: VoucherResponseBody = decode(response).await?;
            return body.into_outcome(code);
        }

        if status.is_client_error() {
            let reason = error_body(response).await.reason();
            info!(status = status.as_u16(), ?reason, "Voucher rejected");
            return Ok(VoucherOutcome::Rejected { reason });
        }

        Err(service_error(response).await)
    }

    #[tracing::instrument(skip(self, request), fields(voucher = ?request.trip.voucher_code))]
    async fn submit_booking(&self, request: &BookingRequest) -> ClientResult<BookingConfirmation> {
        let body = BookingRequestBody::from(request);

        let response = self.post(SUBMIT_BOOKING_PATH, &body).await?;
        if !response.status().is_success() {
            return Err(service_error(response).await);
        }

        let body: BookingResponseBody = decode(response).await?;
        let confirmation = BookingConfirmation::from(body);
        info!(booking_id = %confirmation.booking_id, "Booking submitted");
        Ok(confirmation)
    }
}

// =============================================================================
// Response Helpers
// =============================================================================

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn error_body(response: Response) -> ErrorBody {
    match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => ErrorBody::default(),
    }
}

/// Turns a non-2xx response into `ClientError::Service`.
async fn service_error(response: Response) -> ClientError {
    let status = response.status();
    let message = error_body(response)
        .await
        .reason()
        .unwrap_or_else(|| fallback_message(status));

    error!(status = status.as_u16(), %message, "Service returned an error");
    ClientError::Service {
        status: status.as_u16(),
        message,
    }
}

fn fallback_message(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            "Not authorised to use the booking service".to_string()
        }
        StatusCode::CONFLICT => "The requested slot is no longer available".to_string(),
        _ => GENERIC_SERVICE_MESSAGE.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
