//! The six checkout step operations.
//!
//! Each operation lives on [`CheckoutClient`] and returns a
//! [`StepResult`]. Operations never return `Err`: transport errors,
//! non-2xx statuses, and unusable bodies all come back as a failed result
//! carrying a [`StepFailure`]. Every response's cookies are applied to the
//! [`Session`] before the status is checked.

mod address;
mod cart;
mod contact;
mod order;
mod payment;
mod shipping;

pub use cart::MISSING_SHIPPING_WARNING;

use crate::config::{CheckoutConfig, RetailerConfig};
use crate::core::{StepId, StepRecord, StepResult};
use crate::encryption::{generate_device_id, PaymentEncryptor};
use crate::errors::{CheckoutError, FailureKind, StepFailure};
use crate::models::{BrowserInfo, OrderOptions};
use crate::session::Session;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a step produced on success: HTTP status, parsed body, typed value.
type StepOutput<T> = (Option<u16>, Option<serde_json::Value>, T);

/// Issues the checkout requests for one retailer.
#[derive(Clone)]
pub struct CheckoutClient {
    transport: Arc<dyn HttpTransport>,
    encryptor: Arc<dyn PaymentEncryptor>,
    retailer: RetailerConfig,
    order: OrderOptions,
    browser: BrowserInfo,
    device_id: String,
}

impl std::fmt::Debug for CheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("base_url", &self.retailer.base_url)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl CheckoutClient {
    /// Creates a client with default order options and browser info.
    ///
    /// The device id comes from `retailer.device_id` or is generated.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        encryptor: Arc<dyn PaymentEncryptor>,
        retailer: RetailerConfig,
    ) -> Self {
        let device_id = retailer
            .device_id
            .clone()
            .unwrap_or_else(generate_device_id);
        let browser = BrowserInfo::default().with_user_agent(retailer.user_agent.clone());
        Self {
            transport,
            encryptor,
            retailer,
            order: OrderOptions::default(),
            browser,
            device_id,
        }
    }

    /// Creates a client backed by `reqwest` from a run configuration.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let transport = Arc::new(ReqwestTransport::from_config(&config.retailer)?);
        Ok(Self::new(
            transport,
            config.pipeline.encryption.encryptor(),
            config.retailer.clone(),
        )
        .with_order_options(config.order.clone())
        .with_browser_info(config.browser.clone()))
    }

    /// Sets the order flags.
    #[must_use]
    pub fn with_order_options(mut self, order: OrderOptions) -> Self {
        self.order = order;
        self
    }

    /// Sets the browser fingerprint.
    #[must_use]
    pub fn with_browser_info(mut self, browser: BrowserInfo) -> Self {
        self.browser = browser;
        self
    }

    /// Pins the device id.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Retailer settings.
    #[must_use]
    pub fn retailer(&self) -> &RetailerConfig {
        &self.retailer
    }

    /// Device id sent with orders.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Static headers sent with every request.
    #[must_use]
    pub fn base_headers(&self) -> Vec<(String, String)> {
        let base = self.retailer.base();
        let mut headers = vec![
            ("user-agent".to_string(), self.retailer.user_agent.clone()),
            ("accept".to_string(), "application/json".to_string()),
            (
                "accept-language".to_string(),
                self.retailer.accept_language.clone(),
            ),
            ("origin".to_string(), base.to_string()),
            ("referer".to_string(), format!("{base}/checkout")),
            ("x-api-lang".to_string(), self.retailer.api_lang.clone()),
        ];
        headers.extend(
            self.retailer
                .extra_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        headers
    }

    /// Sends `request` with session state attached and folds the response
    /// back into the session.
    ///
    /// Non-2xx responses and transport errors become failures for `step`.
    async fn exchange(
        &self,
        step: StepId,
        session: &mut Session,
        request: HttpRequest,
    ) -> Result<HttpResponse, StepFailure> {
        let mut request = request.with_headers(self.base_headers());
        if let Some(cookie) = session.cookie_header() {
            request = request.with_header("cookie", cookie);
        }
        request = request.with_headers(session.tokens().clone());

        debug!(step = step.index(), name = step.name(), method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(step = step.index(), name = step.name(), error = %e, "request failed");
            StepFailure::network(step, &e)
        })?;

        let changed = session.absorb_response_headers(&response.headers);
        debug!(step = step.index(), status = response.status, cookies_changed = changed, "response received");

        if !response.is_success() {
            let failure = StepFailure::http_status(step, response.status, &response.body);
            warn!(
                step = step.index(),
                name = step.name(),
                http_status = response.status,
                snippet = failure.snippet.as_deref().unwrap_or(""),
                "unexpected status"
            );
            return Err(failure);
        }
        Ok(response)
    }
}

/// Serializes a request payload.
fn to_body<T: Serialize>(step: StepId, payload: &T) -> Result<serde_json::Value, StepFailure> {
    serde_json::to_value(payload).map_err(|e| {
        StepFailure::new(
            Some(step),
            FailureKind::ValidationFailure,
            format!("failed to encode request: {e}"),
        )
    })
}

/// Turns a step outcome into a [`StepResult`].
fn settle<T>(
    step: StepId,
    started_at: DateTime<Utc>,
    outcome: Result<StepOutput<T>, StepFailure>,
) -> StepResult<T> {
    match outcome {
        Ok((http_status, body, value)) => {
            StepResult::ok(StepRecord::succeeded(step, started_at, http_status, body), value)
        }
        Err(failure) => StepResult::failed(step, started_at, failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::{is_device_id, PlaceholderEncryptor};
    use crate::testing::{MockReply, MockTransport};

    fn client(transport: Arc<MockTransport>) -> CheckoutClient {
        CheckoutClient::new(
            transport,
            Arc::new(PlaceholderEncryptor::new()),
            RetailerConfig::new().with_header("x-extra", "1"),
        )
    }

    #[test]
    fn test_generates_device_id_when_unset() {
        let client = client(Arc::new(MockTransport::new()));
        assert!(is_device_id(client.device_id()));

        let pinned = CheckoutClient::new(
            Arc::new(MockTransport::new()),
            Arc::new(PlaceholderEncryptor::new()),
            RetailerConfig::new().with_device_id("fixed"),
        );
        assert_eq!(pinned.device_id(), "fixed");
    }

    #[test]
    fn test_base_headers() {
        let headers = client(Arc::new(MockTransport::new())).base_headers();
        let get = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("accept"), Some("application/json"));
        assert_eq!(get("referer"), Some("https://www.footlocker.com/checkout"));
        assert_eq!(get("origin"), Some("https://www.footlocker.com"));
        assert_eq!(get("x-api-lang"), Some("en-US"));
        assert_eq!(get("x-extra"), Some("1"));
    }

    #[tokio::test]
    async fn test_exchange_attaches_session_and_absorbs_cookies() {
        let transport = Arc::new(MockTransport::new().route(
            "/thing",
            MockReply::json(200, serde_json::json!({})).with_header("set-cookie", "JSESSIONID=new"),
        ));
        let client = client(transport.clone());
        let mut session = Session::from_cookie_header("JSESSIONID=old; ZGWID=z");
        session.absorb_response_headers(&[("x-csrf-token".to_string(), "t".to_string())]);

        let response = client
            .exchange(
                StepId::SubmitContactInfo,
                &mut session,
                HttpRequest::get("https://www.footlocker.com/thing"),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let sent = &transport.requests()[0];
        assert_eq!(sent.header("cookie"), Some("JSESSIONID=old; ZGWID=z"));
        assert_eq!(sent.header("x-csrf-token"), Some("t"));
        assert_eq!(session.cookie("JSESSIONID"), Some("new"));
    }

    #[tokio::test]
    async fn test_exchange_maps_status_and_transport_errors() {
        let transport = Arc::new(
            MockTransport::new()
                .route("/bad", MockReply::text(503, "maintenance"))
                .route("/down", MockReply::timeout()),
        );
        let client = client(transport);
        let mut session = Session::new();

        let failure = client
            .exchange(
                StepId::RefreshCart,
                &mut session,
                HttpRequest::get("https://www.footlocker.com/bad"),
            )
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::HttpStatusFailure);
        assert_eq!(failure.snippet.as_deref(), Some("maintenance"));

        let failure = client
            .exchange(
                StepId::RefreshCart,
                &mut session,
                HttpRequest::get("https://www.footlocker.com/down"),
            )
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::NetworkFailure);
        assert_eq!(failure.step, Some(StepId::RefreshCart));
    }

    #[test]
    fn test_settle() {
        let ok = settle(StepId::PreparePayment, Utc::now(), Ok((None, None, 1)));
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&1));

        let failed: StepResult<u8> = settle(
            StepId::PlaceOrder,
            Utc::now(),
            Err(StepFailure::invalid_response(StepId::PlaceOrder, "x")),
        );
        assert!(!failed.is_success());
    }
}
