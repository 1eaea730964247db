//! Observability setup for parley: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
