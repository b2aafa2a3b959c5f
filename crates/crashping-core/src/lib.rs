//! crashping Core - Domain logic for crash capture and telemetry bootstrap
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Fault`, `CrashEvent`, `EventMetric`, `PingDefinition`
//! - **Use cases** - `InitializeTelemetryUseCase`, `CaptureFaultUseCase`
//! - **Port definitions** - Traits for adapters: `ITelemetryClient`, `IPingUploader`
//! - **State machine** - The `Idle -> Captured` fault capture lifecycle
//!
//! # Architecture
//!
//! The domain module contains pure data types with no I/O.
//! Ports define trait interfaces that the telemetry crate implements.
//! Use cases orchestrate domain types through port interfaces, so the
//! application holds one explicitly constructed context instead of
//! process-wide singletons.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
