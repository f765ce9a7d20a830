//! Liver Stage Prediction API Library
//!
//! This library provides the core functionality for the liver disease stage
//! prediction service: request parsing, feature derivation, the scaler and
//! classifier seams, explanation text and the HTTP handlers, plus a small
//! client for the prediction endpoint.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core domain logic.
//! - `integrations`: External model and endpoint integrations.
//! - `client`: Form client for the prediction endpoint.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `explanation`: Threshold-band explanation sentences.
//! - `features`: Derived features (AST/ALT, FIB-4, A/G, AFLD).
//! - `handlers`: HTTP request handlers and router.
//! - `model_artifacts`: Scaler/classifier traits and the bundled adapters.
//! - `models`: Wire and domain models.
//! - `prediction`: Feature vector assembly and the prediction pipeline.
//! - `stage`: Disease stage labels and explanations.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod client;
pub mod config;
pub mod errors;
pub mod explanation;
pub mod features;
pub mod handlers;
pub mod model_artifacts;
pub mod models;
pub mod prediction;
pub mod stage;
