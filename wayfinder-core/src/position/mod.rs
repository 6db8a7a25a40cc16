//! Host position capability.
//!
//! The [`PositionProvider`] trait wraps the platform's one-shot and
//! continuous location queries behind a uniform contract and normalizes the
//! platform's error codes into [`PositionErrorCode`]. It is a faithful
//! pass-through: no retry or fallback policy lives here.

mod error;
mod provider;

pub use error::{PositionError, PositionErrorCode};
pub use provider::{
    PositionOptions, PositionProvider, PositionSample, Watch, WatchEvent, WatchHandle,
};
