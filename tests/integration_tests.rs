//! Main integration test entry point for sermon-stream
//!
//! This file serves as the entry point for all integration tests.

mod integration;
