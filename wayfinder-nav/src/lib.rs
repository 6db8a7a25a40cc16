//! Position tracking and route orchestration for the wayfinder engine.
//!
//! [`Navigator`] is the entry point. It owns a [`PositionTracker`], which
//! runs the acquisition state machine (one-shot request, fallback, bounded
//! retries, continuous watch and restart), and a [`RouteOrchestrator`],
//! which turns the current position and destination into a route drawn on
//! the map.
//!
//! Everything runs on one thread. Background work is spawned with
//! [`tokio::task::spawn_local`], so the navigator must be driven from
//! inside a [`tokio::task::LocalSet`].
#![forbid(unsafe_code)]

pub mod acquisition;
pub mod advisory;
pub mod config;
pub mod navigator;
pub mod options;
pub mod route;
pub mod session;

pub use acquisition::{FixNotice, PositionTracker};
pub use advisory::{Advisory, AdvisoryBoard};
pub use config::{AcquisitionPolicy, ConfigError, NavigatorConfig, RouteStyle};
pub use navigator::{Collaborators, Navigator, NavigatorSnapshot};
pub use route::{RouteOrchestrator, compute_route, normalize_route};
pub use session::{AcquisitionError, AcquisitionSession, AcquisitionStatus, PendingTimer};

use std::cell::RefCell;
use std::rc::Rc;

use wayfinder_core::MapView;

/// Map surface shared between the tracker and the route orchestrator.
pub type SharedMap = Rc<RefCell<dyn MapView>>;

/// Advisory slot shared between the tracker and the route orchestrator.
pub type SharedAdvisories = Rc<RefCell<AdvisoryBoard>>;
