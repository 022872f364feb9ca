//! Test doubles and fixtures for exercising the adapter.
//!
//! These are exported publicly so downstream hosts can test their own
//! function bindings against mock framework collaborators.

pub mod fixtures;
mod mocks;

pub use mocks::{CountingStartup, FailingStartup, MockPipeline, SlowStartup};
