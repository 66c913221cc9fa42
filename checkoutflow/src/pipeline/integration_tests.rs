//! End-to-end runs against a scripted transport.

#[cfg(test)]
mod tests {
    use crate::config::CheckoutConfig;
    use crate::core::{StepId, StepStatus};
    use crate::encryption::MockPaymentEncryptor;
    use crate::errors::FailureKind;
    use crate::events::{
        CollectingEventSink, FileEventSink, PIPELINE_FAILED, PIPELINE_SUCCEEDED, STEP_STARTED,
        STEP_SUCCEEDED,
    };
    use crate::pipeline::{CheckoutPipeline, PipelineOptions};
    use crate::session::Session;
    use crate::steps::{CheckoutClient, MISSING_SHIPPING_WARNING};
    use crate::testing::fixtures::{
        happy_path_transport, sample_config, sample_inputs, sample_retailer, sample_session,
        test_client, test_pipeline, with_happy_path, SAMPLE_ORDER_ID,
    };
    use crate::testing::{
        assert_outcome_failed_at, assert_outcome_succeeded, MockReply, MockTransport,
    };
    use serde_json::json;
    use std::sync::Arc;

    const USER_INFO: &str = "/cart/userInfo";
    const VERIFY: &str = "/address/verification";
    const SHIPPING: &str = "/cart/address";
    const CART: &str = "/cart/getUpdatedCart";
    const PLACE_ORDER: &str = "/cart/placeOrder";

    #[tokio::test]
    async fn test_complete_flow_runs_steps_in_order() {
        let transport = Arc::new(happy_path_transport());
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = test_pipeline(transport.clone()).with_event_sink(sink.clone());

        let outcome = pipeline
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_succeeded(&outcome);
        assert_eq!(outcome.order_id(), Some(SAMPLE_ORDER_ID));
        let paths = transport.request_paths();
        assert_eq!(paths.len(), 5);
        for (path, suffix) in paths.iter().zip([USER_INFO, VERIFY, SHIPPING, CART, PLACE_ORDER]) {
            assert!(path.ends_with(suffix), "{path} does not end with {suffix}");
        }

        assert_eq!(sink.events_of_type(STEP_STARTED).len(), 6);
        assert_eq!(sink.events_of_type(STEP_SUCCEEDED).len(), 6);
        let finished = sink.events_of_type(PIPELINE_SUCCEEDED);
        assert_eq!(finished.len(), 1);
        assert_eq!(
            finished[0].1.as_ref().map(|d| d["order_id"].clone()),
            Some(json!(SAMPLE_ORDER_ID))
        );
    }

    #[tokio::test]
    async fn test_non_2xx_stops_the_run() {
        let transport = Arc::new(with_happy_path(
            MockTransport::new().route(VERIFY, MockReply::text(500, "upstream error")),
        ));
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = test_pipeline(transport.clone()).with_event_sink(sink.clone());

        let outcome = pipeline
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_failed_at(&outcome, StepId::VerifyAddress, FailureKind::HttpStatusFailure);
        assert_eq!(outcome.failure.as_ref().and_then(|f| f.http_status), Some(500));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.calls_to(SHIPPING), 0);
        assert_eq!(sink.events_of_type(PIPELINE_FAILED).len(), 1);
    }

    #[tokio::test]
    async fn test_verified_address_is_used_for_shipping() {
        let transport = Arc::new(with_happy_path(MockTransport::new().route(
            VERIFY,
            MockReply::json(
                200,
                json!({
                    "decision": "Accepted",
                    "suggestedAddresses": [{
                        "line1": "1 MORRIS RD",
                        "town": "SOUTH HILL",
                        "postalCode": "23970-5627",
                        "region": {"isocodeShort": "VA"},
                        "country": {"isocode": "US"}
                    }]
                }),
            ),
        )));

        let outcome = test_pipeline(transport.clone())
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_succeeded(&outcome);
        let body = transport.request_to(SHIPPING).and_then(|r| r.body).unwrap();
        assert_eq!(body["shippingAddress"]["line1"], "1 MORRIS RD");
        assert_eq!(body["shippingAddress"]["town"], "SOUTH HILL");
        assert_eq!(body["shippingAddress"]["firstName"], "kazmi");
    }

    #[tokio::test]
    async fn test_timeout_at_cart_refresh_never_encrypts() {
        let transport = Arc::new(with_happy_path(
            MockTransport::new().route(CART, MockReply::timeout()),
        ));
        let mut encryptor = MockPaymentEncryptor::new();
        encryptor.expect_encrypt().times(0);
        let client = CheckoutClient::new(transport.clone(), Arc::new(encryptor), sample_retailer());
        let pipeline = CheckoutPipeline::new(client, PipelineOptions::default());

        let outcome = pipeline
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_failed_at(&outcome, StepId::RefreshCart, FailureKind::NetworkFailure);
        assert_eq!(outcome.failure.as_ref().and_then(|f| f.http_status), None);
        assert_eq!(transport.calls_to(PLACE_ORDER), 0);
    }

    #[tokio::test]
    async fn test_missing_cookie_fails_before_any_request() {
        let transport = Arc::new(happy_path_transport());
        let mut session = Session::from_cookie_header("JSESSIONID=only");

        let outcome = test_pipeline(transport.clone())
            .complete_order_flow(&mut session, &sample_inputs())
            .await;

        assert!(outcome.is_configuration_failure());
        assert!(outcome.failure.as_ref().unwrap().reason.contains("ZGWID"));
        assert!(outcome.records.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_set_cookie_is_threaded_to_later_steps() {
        let transport = Arc::new(with_happy_path(MockTransport::new().route(
            USER_INFO,
            MockReply::json(200, json!({})).with_header("set-cookie", "JSESSIONID=rotated; Path=/"),
        )));
        let mut session = sample_session();

        let outcome = test_pipeline(transport.clone())
            .complete_order_flow(&mut session, &sample_inputs())
            .await;

        assert_outcome_succeeded(&outcome);
        let requests = transport.requests();
        assert_eq!(
            requests[0].header("cookie"),
            Some("JSESSIONID=session-1; ZGWID=zgw-1")
        );
        for later in &requests[1..] {
            assert_eq!(later.header("cookie"), Some("JSESSIONID=rotated; ZGWID=zgw-1"));
        }
        assert_eq!(session.cookie("JSESSIONID"), Some("rotated"));
        assert_eq!(session.cart_id(), Some("cart-1"));
    }

    fn cart_without_shipping() -> MockTransport {
        with_happy_path(
            MockTransport::new().route(CART, MockReply::json(200, json!({"cartId": "cart-1"}))),
        )
    }

    #[tokio::test]
    async fn test_cart_without_shipping_is_a_warning_by_default() {
        let transport = Arc::new(cart_without_shipping());

        let outcome = test_pipeline(transport.clone())
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_succeeded(&outcome);
        let record = outcome.record(StepId::RefreshCart).unwrap();
        assert_eq!(record.status, StepStatus::SoftFail);
        assert_eq!(record.warning.as_deref(), Some(MISSING_SHIPPING_WARNING));
        assert_eq!(transport.calls_to(PLACE_ORDER), 1);
    }

    #[tokio::test]
    async fn test_cart_without_shipping_fails_when_strict() {
        let transport = Arc::new(cart_without_shipping());
        let pipeline = CheckoutPipeline::new(
            test_client(transport.clone()),
            PipelineOptions::default().with_strict_cart_refresh(true),
        );

        let outcome = pipeline
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_failed_at(&outcome, StepId::RefreshCart, FailureKind::ValidationFailure);
        assert_eq!(outcome.failure.as_ref().and_then(|f| f.http_status), Some(200));
        assert_eq!(transport.calls_to(PLACE_ORDER), 0);
    }

    #[tokio::test]
    async fn test_order_without_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("checkout.log");
        let transport = Arc::new(with_happy_path(MockTransport::new().route(
            PLACE_ORDER,
            MockReply::json(200, json!({"status": "DECLINED_BY_ISSUER"})),
        )));
        let pipeline = test_pipeline(transport)
            .with_event_sink(Arc::new(FileEventSink::open(&log_path).unwrap()));

        let outcome = pipeline
            .complete_order_flow(&mut sample_session(), &sample_inputs())
            .await;

        assert_outcome_failed_at(&outcome, StepId::PlaceOrder, FailureKind::InvalidResponse);
        assert!(outcome.order.is_none());

        let log = std::fs::read_to_string(&log_path).unwrap();
        let failed = log
            .lines()
            .find(|l| l.contains("step failed"))
            .unwrap_or_default();
        assert!(failed.contains("name=place_order http_status=200"), "{failed}");
        assert!(failed.contains("DECLINED_BY_ISSUER"), "{failed}");
    }

    #[tokio::test]
    async fn test_non_2xx_at_any_remote_step_stops_the_run() {
        let cases = [
            (USER_INFO, StepId::SubmitContactInfo, 403, 1),
            (VERIFY, StepId::VerifyAddress, 500, 2),
            (SHIPPING, StepId::SetShippingAddress, 409, 3),
            (CART, StepId::RefreshCart, 502, 4),
            (PLACE_ORDER, StepId::PlaceOrder, 400, 5),
        ];

        for (path, step, status, requests) in cases {
            let transport = Arc::new(with_happy_path(
                MockTransport::new().route(path, MockReply::text(status, "rejected")),
            ));

            let outcome = test_pipeline(transport.clone())
                .complete_order_flow(&mut sample_session(), &sample_inputs())
                .await;

            assert_outcome_failed_at(&outcome, step, FailureKind::HttpStatusFailure);
            let failure = outcome.failure.as_ref().unwrap();
            assert_eq!(failure.http_status, Some(status), "{}", step.name());
            assert_eq!(failure.snippet.as_deref(), Some("rejected"));
            assert_eq!(outcome.steps_run().len(), step.index());
            assert_eq!(transport.requests().len(), requests, "{}", step.name());
            assert!(transport.request_paths()[requests - 1].ends_with(path));
        }
    }

    #[tokio::test]
    async fn test_run_step_place_order_prepares_payment_first() {
        let transport = Arc::new(happy_path_transport());

        let outcome = test_pipeline(transport.clone())
            .run_step(StepId::PlaceOrder, &mut sample_session(), &sample_inputs())
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.steps_run(), vec![StepId::PreparePayment, StepId::PlaceOrder]);
        assert_eq!(transport.request_paths().len(), 1);
        assert_eq!(outcome.order_id(), Some(SAMPLE_ORDER_ID));
    }

    #[tokio::test]
    async fn test_run_step_prepare_payment_needs_no_cookies() {
        let transport = Arc::new(MockTransport::new());

        let outcome = test_pipeline(transport.clone())
            .run_step(StepId::PreparePayment, &mut Session::new(), &sample_inputs())
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.steps_run(), vec![StepId::PreparePayment]);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_step_shipping_uses_entered_address() {
        let transport = Arc::new(happy_path_transport());

        let outcome = test_pipeline(transport.clone())
            .run_step(StepId::SetShippingAddress, &mut sample_session(), &sample_inputs())
            .await;

        assert!(outcome.is_success());
        assert_eq!(transport.calls_to(VERIFY), 0);
        let body = transport.request_to(SHIPPING).and_then(|r| r.body).unwrap();
        assert_eq!(body["shippingAddress"]["line1"], "1 Morris Rd");
    }

    #[tokio::test]
    async fn test_run_from_config_writes_step_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("checkout.log");
        let mut config: CheckoutConfig = sample_config();
        config.pipeline.log_file = log_path.clone();

        let transport = Arc::new(happy_path_transport());
        let client = CheckoutClient::new(
            transport,
            config.pipeline.encryption.encryptor(),
            config.retailer.clone(),
        );
        let pipeline = CheckoutPipeline::new(client, config.pipeline_options())
            .with_event_sink(Arc::new(FileEventSink::open(&config.pipeline.log_file).unwrap()));

        let outcome = pipeline
            .complete_order_flow(&mut config.session(), &config.inputs())
            .await;

        assert_outcome_succeeded(&outcome);
        let log = std::fs::read_to_string(&log_path).unwrap();
        let step_lines: Vec<&str> = log.lines().filter(|l| l.contains("step succeeded")).collect();
        assert_eq!(step_lines.len(), 6);
        for (line, step) in step_lines.iter().zip(StepId::ALL) {
            assert!(line.contains(&format!("step={}", step.index())), "{line}");
            assert!(line.contains(&format!("name={}", step.name())), "{line}");
        }
        assert!(log.contains(&format!("order_id={SAMPLE_ORDER_ID}")));
    }
}
