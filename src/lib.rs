//! RMON Provider Core
//!
//! This crate provides the API client and resource layer for building an
//! RMON infrastructure-as-code provider. RMON is a distributed monitoring
//! service; the provider manages its agents, regions, countries, alert
//! channels, and the whole family of health checks through the RMON REST
//! API.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **API client**: An authenticated, retrying HTTP client with
//!   single-flight session refresh
//! - **Resource catalog**: Every resource kind and wire field declared once,
//!   driving schema, validation, and CRUD
//! - **Schema types**: Types for describing provider and resource schemas
//! - **ProviderService trait**: The high-level seam an orchestrating tool
//!   talks to, implemented for the full registry by [`RmonProvider`]
//! - **Error types**: A structured failure taxonomy (configuration,
//!   transport, ambiguous, API, decode)
//! - **Logging**: Integration with `tracing` for structured logging
//! - **Testing**: A harness and assertion helpers for provider tests
//!
//! # Quick Start
//!
//! ```ignore
//! use rmon_provider::{init_logging, ProviderService, RmonProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = RmonProvider::new();
//!     provider
//!         .configure(json!({
//!             "base_url": "https://rmon.example.com",
//!             "login": "admin",
//!             "password": "secret",
//!         }))
//!         .await?;
//!
//!     let state = provider
//!         .create(
//!             "rmon_check_tcp",
//!             json!({
//!                 "name": "db-check",
//!                 "place": "agent",
//!                 "entities": [12],
//!                 "ip": "10.0.0.5",
//!                 "port": 5432,
//!             }),
//!         )
//!         .await?;
//!
//!     println!("created check {}", state["id"]);
//!     Ok(())
//! }
//! ```
//!
//! # Wire Protocol
//!
//! The RMON API is plain JSON over HTTP:
//!
//! - **POST /api/v1.0/login**: Session bootstrap, returns a bearer token
//! - **POST {path}**: Create, returns `{"id": <number>}`
//! - **GET {path}/{id}**: Read one entity
//! - **PUT {path}/{id}**: Full-object update
//! - **DELETE {path}/{id}**: Delete
//!
//! The service stores booleans as `0`/`1` integers and rejects single
//! quotes in free-text fields; the resource layer translates both ways so
//! provider state stays typed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::Client;
pub use config::{ClientConfig, RetryConfig};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{ProviderMetadata, ProviderService, RmonProvider};
pub use schema::ProviderSchema;
pub use types::{AttributeChange, ImportedResource, PlanResult};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
