//! Routing backend contract.
//!
//! The [`RoutingBackend`] trait fetches a route between two coordinates for
//! a travel profile. Backends return [`RouteResponse`] values that still carry
//! the backend's status code and longitude-first geometry; turning those into
//! a [`RouteResult`](crate::RouteResult) is the route orchestrator's job.

mod backend;
mod error;

pub use backend::{
    BackendLeg, BackendRoute, BackendStep, OK_CODE, RouteRequest, RouteResponse, RoutingBackend,
};
pub use error::RouteError;
