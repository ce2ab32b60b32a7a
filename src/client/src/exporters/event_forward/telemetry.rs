use super::error::EventForwardError;
use forwarder_common::telemetry::TelemetryContext;

/// Report event forwarding failures to Sentry with appropriate categorization
pub fn report_forward_failure_to_sentry(
    endpoint: &str,
    error: &EventForwardError,
    event_count: usize,
    attempts: usize,
) {
    let error_msg = format!(
        "Event forward failed after {} attempt(s): {}",
        attempts, error
    );

    let mut context = TelemetryContext::new("event_forward", error.error_category())
        .with_endpoint(endpoint)
        .with_event_count(event_count)
        .add_field("attempts", attempts)
        .with_error(error);

    if let EventForwardError::Server { status, body } = error {
        context = context.with_http_status(*status).with_response_body(body);
    }

    context.report_to_sentry("event_forward_failure", &error_msg, sentry::Level::Error);
}
