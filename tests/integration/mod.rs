//! Integration tests for reqchain
//!
//! Chains run over the real `reqwest` transport against local
//! `wiremock` servers, so no external services are needed.
//!
//! Run with: cargo test --test integration

mod helpers;

mod declarative;
mod failures;
mod output_files;
mod scripted;
