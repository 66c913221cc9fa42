//! Sequential execution of the checkout steps.

use super::PipelineOutcome;
use crate::config::{default_required_cookies, CheckoutConfig};
use crate::core::{StepId, StepResult, StepStatus};
use crate::errors::{CheckoutError, StepFailure};
use crate::events::{
    EventData, EventSink, FanoutEventSink, FileEventSink, LoggingEventSink, NoOpEventSink,
    PIPELINE_FAILED, PIPELINE_SUCCEEDED, STEP_FAILED, STEP_SOFT_FAILED, STEP_STARTED,
    STEP_SUCCEEDED,
};
use crate::models::{ContactInfo, OrderConfirmation, PaymentInfo, ShippingAddress, VerifiedAddress};
use crate::session::Session;
use crate::steps::CheckoutClient;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Flags that change how step outcomes are judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Treat a cart without a shipping address as a failure.
    pub strict_cart_refresh: bool,
    /// Cookies that must be present before the first request.
    pub required_cookies: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            strict_cart_refresh: false,
            required_cookies: default_required_cookies(),
        }
    }
}

impl PipelineOptions {
    /// Sets cart refresh strictness.
    #[must_use]
    pub fn with_strict_cart_refresh(mut self, strict: bool) -> Self {
        self.strict_cart_refresh = strict;
        self
    }

    /// Replaces the required cookie names.
    #[must_use]
    pub fn with_required_cookies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_cookies = names.into_iter().map(Into::into).collect();
        self
    }
}

/// The buyer records a run submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutInputs {
    /// Contact details.
    pub contact: ContactInfo,
    /// Shipping address as entered.
    pub address: ShippingAddress,
    /// Card details.
    pub payment: PaymentInfo,
}

/// Runs the six checkout steps in order, stopping at the first failure.
pub struct CheckoutPipeline {
    client: CheckoutClient,
    options: PipelineOptions,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for CheckoutPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutPipeline")
            .field("client", &self.client)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CheckoutPipeline {
    /// Creates a pipeline that emits no events.
    #[must_use]
    pub fn new(client: CheckoutClient, options: PipelineOptions) -> Self {
        Self {
            client,
            options,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Creates a pipeline from a run configuration.
    ///
    /// Events go to `tracing` and are appended to `pipeline.log_file`.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, CheckoutError> {
        let file_sink = FileEventSink::open(&config.pipeline.log_file)?;
        let sink = FanoutEventSink::new()
            .with_sink(Arc::new(LoggingEventSink::default()))
            .with_sink(Arc::new(file_sink));
        Ok(Self::new(CheckoutClient::from_config(config)?, config.pipeline_options())
            .with_event_sink(Arc::new(sink)))
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &CheckoutClient {
        &self.client
    }

    /// The pipeline options.
    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs steps 1 through 6.
    ///
    /// The verified address from step 2 is what step 3 sets on the cart.
    /// A missing required cookie fails the run before any request.
    pub async fn complete_order_flow(
        &self,
        session: &mut Session,
        inputs: &CheckoutInputs,
    ) -> PipelineOutcome {
        let mut run = RunTracker::new(self.sink.as_ref(), &self.options);
        info!(run_id = %run.run_id, "starting checkout");
        if let Err(failure) = self.preflight(session) {
            return run.finish(Some(failure), None).await;
        }

        let client = &self.client;
        if run
            .step(StepId::SubmitContactInfo, client.submit_contact_info(session, &inputs.contact))
            .await
            .is_none()
        {
            return run.stop().await;
        }
        let Some(verified) = run
            .step(StepId::VerifyAddress, client.verify_address(session, &inputs.address))
            .await
        else {
            return run.stop().await;
        };
        if run
            .step(
                StepId::SetShippingAddress,
                client.set_shipping_address(session, &inputs.contact, &verified),
            )
            .await
            .is_none()
        {
            return run.stop().await;
        }
        if run
            .step(StepId::RefreshCart, client.refresh_cart(session))
            .await
            .is_none()
        {
            return run.stop().await;
        }
        let Some(block) = run
            .step(StepId::PreparePayment, async {
                client.prepare_payment(&inputs.payment)
            })
            .await
        else {
            return run.stop().await;
        };
        let order = run
            .step(StepId::PlaceOrder, client.place_order(session, &block))
            .await;
        run.finish(None, order).await
    }

    /// Runs a single step in isolation.
    ///
    /// Prerequisites are built locally without requests: setting the
    /// shipping address uses `inputs.address` as if verified, and placing
    /// the order prepares the payment block first (recorded as its own
    /// step). The required-cookie check applies to steps that send a
    /// request.
    pub async fn run_step(
        &self,
        step: StepId,
        session: &mut Session,
        inputs: &CheckoutInputs,
    ) -> PipelineOutcome {
        let mut run = RunTracker::new(self.sink.as_ref(), &self.options);
        info!(run_id = %run.run_id, step = step.index(), name = step.name(), "running single step");
        if step.contacts_remote() {
            if let Err(failure) = self.preflight(session) {
                return run.finish(Some(failure), None).await;
            }
        }

        let client = &self.client;
        let order = match step {
            StepId::SubmitContactInfo => {
                run.step(step, client.submit_contact_info(session, &inputs.contact))
                    .await;
                None
            }
            StepId::VerifyAddress => {
                run.step(step, client.verify_address(session, &inputs.address))
                    .await;
                None
            }
            StepId::SetShippingAddress => {
                let verified = VerifiedAddress::from(&inputs.address);
                run.step(step, client.set_shipping_address(session, &inputs.contact, &verified))
                    .await;
                None
            }
            StepId::RefreshCart => {
                run.step(step, client.refresh_cart(session)).await;
                None
            }
            StepId::PreparePayment => {
                run.step(step, async { client.prepare_payment(&inputs.payment) })
                    .await;
                None
            }
            StepId::PlaceOrder => {
                match run
                    .step(StepId::PreparePayment, async {
                        client.prepare_payment(&inputs.payment)
                    })
                    .await
                {
                    Some(block) => run.step(step, client.place_order(session, &block)).await,
                    None => None,
                }
            }
        };
        run.finish(None, order).await
    }

    fn preflight(&self, session: &Session) -> Result<(), StepFailure> {
        session
            .ensure_cookies(&self.options.required_cookies)
            .map_err(|e| StepFailure::configuration(&e))
    }
}

/// Collects records and emits events for one run.
struct RunTracker<'a> {
    sink: &'a dyn EventSink,
    strict_cart_refresh: bool,
    run_id: Uuid,
    started_at: chrono::DateTime<Utc>,
    clock: Instant,
    records: Vec<crate::core::StepRecord>,
    failure: Option<StepFailure>,
}

impl<'a> RunTracker<'a> {
    fn new(sink: &'a dyn EventSink, options: &PipelineOptions) -> Self {
        Self {
            sink,
            strict_cart_refresh: options.strict_cart_refresh,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            clock: Instant::now(),
            records: Vec::new(),
            failure: None,
        }
    }

    fn data(&self) -> EventData {
        EventData::new(self.run_id)
    }

    /// Runs one step and records it. Returns the step's value if the run
    /// may continue.
    async fn step<T>(
        &mut self,
        step: StepId,
        operation: impl Future<Output = StepResult<T>>,
    ) -> Option<T> {
        self.sink
            .emit(STEP_STARTED, Some(self.data().with_step(step).into_value()))
            .await;

        let (mut record, value) = operation.await.into_parts();
        if record.status == StepStatus::SoftFail
            && record.step == StepId::RefreshCart
            && self.strict_cart_refresh
        {
            let reason = record.warning.clone().unwrap_or_default();
            let mut failure = StepFailure::validation(step, reason);
            failure.http_status = record.http_status;
            record = record.harden(failure);
        }

        let data = self
            .data()
            .with_step(step)
            .with_http_status(record.http_status);
        match (record.status, &record.failure) {
            (StepStatus::Fail, Some(failure)) => {
                self.sink
                    .emit(STEP_FAILED, Some(data.with_failure(failure).into_value()))
                    .await;
            }
            (StepStatus::SoftFail, _) => {
                let warning = record.warning.clone().unwrap_or_default();
                self.sink
                    .emit(STEP_SOFT_FAILED, Some(data.with_reason(warning).into_value()))
                    .await;
            }
            _ => {
                self.sink
                    .emit(STEP_SUCCEEDED, Some(data.into_value()))
                    .await;
            }
        }

        let proceed = record.is_success();
        if !proceed {
            self.failure = record.failure.clone();
        }
        self.records.push(record);
        if proceed {
            value
        } else {
            None
        }
    }

    /// Ends the run after a failed step.
    async fn stop(self) -> PipelineOutcome {
        self.finish(None, None).await
    }

    /// Ends the run. `failure` overrides any recorded step failure.
    async fn finish(
        mut self,
        failure: Option<StepFailure>,
        order: Option<OrderConfirmation>,
    ) -> PipelineOutcome {
        if failure.is_some() {
            self.failure = failure;
        }
        let outcome = PipelineOutcome {
            run_id: self.run_id,
            records: self.records,
            failure: self.failure,
            order,
            started_at: self.started_at,
            duration_ms: self.clock.elapsed().as_secs_f64() * 1000.0,
        };

        let data = EventData::new(self.run_id);
        match outcome.failure {
            Some(ref failure) => {
                self.sink
                    .emit(PIPELINE_FAILED, Some(data.with_failure(failure).into_value()))
                    .await;
            }
            None => {
                let data = match outcome.order_id() {
                    Some(id) => data.with_order_id(id),
                    None => data,
                };
                self.sink
                    .emit(PIPELINE_SUCCEEDED, Some(data.into_value()))
                    .await;
            }
        }
        outcome
    }
}
