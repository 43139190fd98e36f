//! Logging and OpenTelemetry setup.

use anyhow::Result;
use blast_core::GameId;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_sdk::{
    trace::{Config, RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE: &str = "block-blast";
const DEFAULT_FILTER: &str = "warn,blast_cli=info";

/// Flushes the tracer provider when dropped
pub struct TelemetryGuard;

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        info!("Shutting down telemetry");
        global::shutdown_tracer_provider();
    }
}

/// Spans are only sampled when an OTLP endpoint is configured
fn tracer_provider(otel_endpoint: Option<&str>) -> TracerProvider {
    let sampler = if otel_endpoint.is_some() {
        Sampler::AlwaysOn
    } else {
        Sampler::AlwaysOff
    };

    TracerProvider::builder()
        .with_config(
            Config::default()
                .with_sampler(sampler)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new(SERVICE_NAME, SERVICE),
                    KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build()
}

/// Install the subscriber. Logs go to stderr so they never interleave with the board.
pub fn init_telemetry(otel_endpoint: Option<&str>) -> Result<TelemetryGuard> {
    let provider = tracer_provider(otel_endpoint);
    let tracer = provider.tracer(SERVICE);
    global::set_tracer_provider(provider);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    match otel_endpoint {
        Some(endpoint) => info!(endpoint, "Tracing enabled"),
        None => info!("Tracing disabled, logging only"),
    }

    Ok(TelemetryGuard)
}

pub fn record_game_started(game_id: GameId) {
    info!(event = "game_started", game_id = %game_id, "Game metric");
}

pub fn record_game_finished(score: u64, turns: u32, personal_best: bool) {
    info!(
        event = "game_finished",
        score,
        turns,
        personal_best,
        "Game metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_provider_builds_with_and_without_endpoint() {
        for endpoint in [None, Some("http://localhost:4317")] {
            let provider = tracer_provider(endpoint);
            let _tracer = provider.tracer(SERVICE);
        }
    }
}
