//! HTTP routing backend for OSRM route services.
//!
//! This module provides [`HttpRoutingBackend`], an implementation of
//! [`wayfinder_core::RoutingBackend`] that fetches turn-by-turn routes from
//! the OSRM Route API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use wayfinder_core::{Coordinate, RouteRequest, RoutingBackend, TransportMode};
//! use wayfinder_data::routing::{HttpRoutingBackend, HttpRoutingBackendConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpRoutingBackendConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let backend = HttpRoutingBackend::with_config(config)?;
//!
//! let request = RouteRequest::turn_by_turn(
//!     Coordinate::new(51.5074, -0.1278)?,
//!     Coordinate::new(51.5007, -0.1246)?,
//!     TransportMode::Foot,
//! );
//! let response = backend.fetch_route(&request).await?;
//! println!("status: {}", response.code);
//! # Ok(())
//! # }
//! ```

mod osrm;
mod provider;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpRoutingBackend, HttpRoutingBackendConfig};
