//! End-to-end tests for endpoint initialization and forwarding.

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationToken;
    use crate::config::EndpointConfiguration;
    use crate::context::{ErrorOutcome, FailureContext, InvocationContext, MessageContext};
    use crate::discovery::{CollectingLoadContext, DiscoveryOptions};
    use crate::endpoint::{EndpointStartup, FunctionEndpoint};
    use crate::errors::BridgeError;
    use crate::events::CollectingEventSink;
    use crate::testing::fixtures::{platform_signer_tokens, write_corrupt_module, write_module};
    use crate::testing::{CountingStartup, FailingStartup, MockPipeline, SlowStartup};
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn endpoint_with(startup: Arc<dyn EndpointStartup>) -> FunctionEndpoint {
        FunctionEndpoint::new(
            startup,
            |_ctx| Ok(EndpointConfiguration::new("orders")),
            DiscoveryOptions::disabled(),
        )
    }

    fn invocation() -> InvocationContext {
        InvocationContext::new(std::env::temp_dir())
    }

    #[tokio::test]
    async fn concurrent_invocations_start_the_endpoint_once() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(
            CountingStartup::new(pipeline).with_delay(Duration::from_millis(20)),
        );
        let endpoint = Arc::new(endpoint_with(startup.clone()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let endpoint = Arc::clone(&endpoint);
                tokio::spawn(async move { endpoint.ensure_started(&invocation()).await })
            })
            .collect();

        let handles: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task should not panic").expect("should start"))
            .collect();

        assert_eq!(startup.start_count(), 1);
        assert_eq!(startup.max_in_flight(), 1);
        for handle in &handles[1..] {
            assert!(Arc::ptr_eq(&handles[0], handle));
        }
    }

    #[tokio::test]
    async fn startup_sequences_never_overlap_even_across_failures() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(FailingStartup::new(pipeline, 2));
        let endpoint = Arc::new(endpoint_with(startup.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let endpoint = Arc::clone(&endpoint);
                tokio::spawn(async move { endpoint.ensure_started(&invocation()).await })
            })
            .collect();

        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task should not panic"))
            .collect();

        let failures = results.iter().filter(|result| result.is_err()).count();
        let successes = results.iter().filter(|result| result.is_ok()).count();

        // Two callers consume the induced failures, the third succeeds and
        // publishes; everyone behind them observes the published handle.
        assert_eq!(failures, 2);
        assert_eq!(successes, 6);
        assert_eq!(startup.start_count(), 3);
        for result in &results {
            if let Err(err) = result {
                assert!(matches!(err, BridgeError::Startup { .. }));
            }
        }
    }

    #[tokio::test]
    async fn cancelled_waiter_fails_without_triggering_startup() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(SlowStartup::new(pipeline));
        let endpoint = Arc::new(endpoint_with(startup.clone()));

        let first = {
            let endpoint = Arc::clone(&endpoint);
            tokio::spawn(async move { endpoint.ensure_started(&invocation()).await })
        };
        startup.entered().await;

        let token = CancellationToken::new();
        let second = {
            let endpoint = Arc::clone(&endpoint);
            let token = token.clone();
            tokio::spawn(async move {
                let ctx = invocation().with_cancellation(token);
                endpoint.ensure_started(&ctx).await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel("host deadline reached");

        let second_result = second.await.expect("task should not panic");
        let err = second_result
            .map(|_| ())
            .expect_err("waiter should be cancelled");
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("host deadline reached"));

        startup.release();
        first
            .await
            .expect("task should not panic")
            .expect("first caller should start the endpoint");

        // The cancelled waiter never ran a startup of its own.
        assert_eq!(startup.start_count(), 1);
    }

    #[tokio::test]
    async fn failed_startup_is_retried_from_scratch() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(FailingStartup::new(pipeline, 1));
        let endpoint = endpoint_with(startup.clone());
        let ctx = invocation();

        let err = endpoint
            .ensure_started(&ctx)
            .await
            .map(|_| ())
            .expect_err("first attempt should fail");
        assert!(matches!(err, BridgeError::Startup { .. }));
        assert!(!endpoint.is_started());

        endpoint
            .ensure_started(&ctx)
            .await
            .expect("second attempt should succeed");
        assert!(endpoint.is_started());
        assert_eq!(startup.start_count(), 2);
    }

    #[tokio::test]
    async fn configuration_factory_failure_reaches_caller_and_is_retried() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(CountingStartup::new(pipeline));
        let attempts = Arc::new(AtomicUsize::new(0));

        let factory_attempts = Arc::clone(&attempts);
        let endpoint = FunctionEndpoint::new(
            startup.clone(),
            move |_ctx| {
                if factory_attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(BridgeError::configuration("connection string missing"))
                } else {
                    Ok(EndpointConfiguration::new("orders"))
                }
            },
            DiscoveryOptions::disabled(),
        );
        let ctx = invocation();

        let err = endpoint
            .ensure_started(&ctx)
            .await
            .map(|_| ())
            .expect_err("factory failure should surface");
        assert!(matches!(err, BridgeError::Configuration(_)));
        assert_eq!(startup.start_count(), 0);

        endpoint
            .ensure_started(&ctx)
            .await
            .expect("second attempt should succeed");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(startup.start_count(), 1);
    }

    #[tokio::test]
    async fn process_forwards_the_exact_message() {
        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(CountingStartup::new(pipeline.clone()));
        let endpoint = endpoint_with(startup);

        let message = MessageContext::new("m-1", b"order payload".to_vec())
            .with_header("content-type", "application/json");

        endpoint
            .process(message.clone(), &invocation())
            .await
            .expect("forwarding should succeed");

        assert_eq!(pipeline.messages(), vec![message]);
    }

    #[tokio::test]
    async fn process_propagates_pipeline_errors_unchanged() {
        let pipeline = Arc::new(MockPipeline::new());
        pipeline.fail_messages_with("handler exploded");
        let startup = Arc::new(CountingStartup::new(pipeline.clone()));
        let endpoint = endpoint_with(startup);

        let err = endpoint
            .process(MessageContext::new("m-2", b"payload".to_vec()), &invocation())
            .await
            .expect_err("pipeline failure should surface");

        assert!(matches!(err, BridgeError::Pipeline { .. }));
        assert!(err.to_string().contains("handler exploded"));
    }

    #[tokio::test]
    async fn process_failed_returns_the_framework_verdict_unchanged() {
        let pipeline = Arc::new(MockPipeline::new());
        pipeline.set_failure_outcome(ErrorOutcome::RetryRequired);
        let startup = Arc::new(CountingStartup::new(pipeline.clone()));
        let endpoint = endpoint_with(startup);

        let failure = FailureContext::new(
            MessageContext::new("m-3", b"payload".to_vec()),
            "handler threw",
        )
        .with_processing_attempts(3);

        let outcome = endpoint
            .process_failed(failure.clone(), &invocation())
            .await
            .expect("failure forwarding should succeed");

        assert_eq!(outcome, ErrorOutcome::RetryRequired);
        assert_eq!(pipeline.failures(), vec![failure]);
    }

    #[tokio::test]
    async fn first_invocation_scans_the_binaries_directory() {
        let app_dir = tempfile::tempdir().expect("tempdir");
        let bin_dir = app_dir.path().join("bin");
        std::fs::create_dir(&bin_dir).expect("create bin dir");

        let tokens = platform_signer_tokens();
        write_module(&bin_dir, "platform-core", "so", tokens[0]).expect("write module");
        write_module(&bin_dir, "platform-extensions", "so", tokens[1]).expect("write module");
        let app_signer = crate::discovery::SignerToken::new([0x51; 8]);
        write_module(&bin_dir, "orders-handlers", "so", app_signer).expect("write module");
        write_module(&bin_dir, "billing-handlers", "so", app_signer).expect("write module");
        write_corrupt_module(&bin_dir, "broken", "so").expect("write corrupt");

        let load_context = Arc::new(CollectingLoadContext::new());
        let discovery = DiscoveryOptions::new(load_context.clone()).with_extension("so");

        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(CountingStartup::new(pipeline));
        let endpoint = FunctionEndpoint::new(
            startup,
            |_ctx| Ok(EndpointConfiguration::new("orders")),
            discovery,
        );

        let sink = Arc::new(CollectingEventSink::new());
        let ctx = InvocationContext::new(app_dir.path()).with_event_sink(sink.clone());

        endpoint
            .ensure_started(&ctx)
            .await
            .expect("startup should succeed despite the corrupt module");

        assert_eq!(
            load_context.loaded_names(),
            vec!["billing-handlers", "orders-handlers"]
        );
        assert_eq!(sink.events_of_type("discovery.module_skipped").len(), 2);
        assert_eq!(sink.events_of_type("discovery.module_failed").len(), 1);
        assert_eq!(sink.events_of_type("endpoint.started").len(), 1);
    }

    #[tokio::test]
    async fn missing_binaries_directory_fails_startup_and_retries_cleanly() {
        let app_dir = tempfile::tempdir().expect("tempdir");

        let load_context = Arc::new(CollectingLoadContext::new());
        let discovery = DiscoveryOptions::new(load_context).with_extension("so");

        let pipeline = Arc::new(MockPipeline::new());
        let startup = Arc::new(CountingStartup::new(pipeline));
        let endpoint = FunctionEndpoint::new(
            startup.clone(),
            |_ctx| Ok(EndpointConfiguration::new("orders")),
            discovery,
        );
        let ctx = InvocationContext::new(app_dir.path());

        let err = endpoint
            .ensure_started(&ctx)
            .await
            .map(|_| ())
            .expect_err("missing bin directory should fail startup");
        assert!(matches!(err, BridgeError::Io(_)));
        assert!(!endpoint.is_started());
        assert_eq!(startup.start_count(), 0);

        std::fs::create_dir(app_dir.path().join("bin")).expect("create bin dir");

        endpoint
            .ensure_started(&ctx)
            .await
            .expect("retry should succeed once the directory exists");
        assert!(endpoint.is_started());
        assert_eq!(startup.start_count(), 1);
    }
}
