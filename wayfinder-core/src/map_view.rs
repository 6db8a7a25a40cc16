//! Abstract map surface.
//!
//! The engine never draws anything itself. It drives a [`MapView`] through
//! a handful of layer operations and always removes a layer before replacing
//! it, so implementations never accumulate stale markers or polylines.

use crate::Coordinate;

/// Identifier of a marker, circle or polyline on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    /// Wrap an arbitrary identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The pulsing dot at the user's position.
    #[must_use]
    pub fn tracking_marker() -> Self {
        Self::new("tracking-marker")
    }

    /// The circle showing the current fix's accuracy radius.
    #[must_use]
    pub fn accuracy_circle() -> Self {
        Self::new("accuracy-circle")
    }

    /// The pin at the selected destination.
    #[must_use]
    pub fn destination_marker() -> Self {
        Self::new("destination-marker")
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a point layer should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum IconSpec {
    /// Animated dot for the user's own position.
    PulsingDot,
    /// Red destination pin with a popup label.
    DestinationPin {
        /// Popup text.
        label: String,
    },
    /// Translucent circle sized to the fix accuracy.
    AccuracyCircle {
        /// Radius in metres.
        radius_meters: f64,
        /// Stroke and fill colour.
        color: &'static str,
    },
}

/// Stroke style for a route polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    /// Stroke colour.
    pub color: String,
    /// Stroke width in pixels.
    pub weight: f64,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: "#3B82F6".to_owned(),
            weight: 6.0,
            opacity: 0.8,
        }
    }
}

/// Rendering surface the engine writes to.
pub trait MapView {
    /// Centre the view on `center` at `zoom`.
    fn set_center(&mut self, center: Coordinate, zoom: u8);

    /// Add a point layer, or move and restyle it if `id` already exists.
    fn add_or_move_marker(&mut self, id: &LayerId, at: Coordinate, icon: &IconSpec);

    /// Remove a layer. Unknown identifiers are ignored.
    fn remove_layer(&mut self, id: &LayerId);

    /// Draw a polyline through lat-first `points` and return its handle.
    fn draw_polyline(&mut self, points: &[Coordinate], style: &PolylineStyle) -> LayerId;

    /// Fit the viewport to the layer's bounds with `padding_px` on each side.
    fn fit_bounds(&mut self, layer: &LayerId, padding_px: u32);

    /// Zoom in one level.
    fn zoom_in(&mut self);

    /// Zoom out one level.
    fn zoom_out(&mut self);
}
