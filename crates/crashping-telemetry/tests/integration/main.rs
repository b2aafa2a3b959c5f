//! Integration tests for crashping-telemetry
//!
//! Exercises the telemetry client against a temporary data directory and
//! the HTTP uploader against a wiremock ingestion server.

mod common;

mod test_client_lifecycle;
mod test_upload;
