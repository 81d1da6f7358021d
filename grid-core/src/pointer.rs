//! Pointer position tracking.

use serde::{Deserialize, Serialize};

use crate::BackingStore;

/// On-screen rectangle of the canvas element, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl ClientRect {
    /// Create a client rect.
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Last known pointer position in canvas drawing space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Default for PointerState {
    /// Off-canvas until the first move event arrives.
    fn default() -> Self {
        Self { x: -100.0, y: -100.0 }
    }
}

impl PointerState {
    /// Create a pointer state.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Map a viewport-space event position into canvas drawing space.
    ///
    /// The offset inside the element is scaled by `backing / rect` and then
    /// divided by the backing scale so that it lands in the same space the
    /// grid is drawn in. Returns `None` when the rect or store is degenerate.
    #[must_use]
    pub fn from_client(
        client_x: f64,
        client_y: f64,
        rect: &ClientRect,
        store: &BackingStore,
    ) -> Option<Self> {
        if rect.width <= 0.0 || rect.height <= 0.0 || store.scale <= 0.0 {
            return None;
        }
        let scale_x = f64::from(store.width) / rect.width;
        let scale_y = f64::from(store.height) / rect.height;
        let x = (client_x - rect.left) * scale_x / store.scale;
        let y = (client_y - rect.top) * scale_y / store.scale;
        (x.is_finite() && y.is_finite()).then_some(Self { x, y })
    }

    /// Move to a viewport-space event position; most recent event wins.
    ///
    /// Returns `false` and leaves the position unchanged when the event
    /// cannot be mapped.
    pub fn update_from_client(
        &mut self,
        client_x: f64,
        client_y: f64,
        rect: &ClientRect,
        store: &BackingStore,
    ) -> bool {
        match Self::from_client(client_x, client_y, rect, store) {
            Some(mapped) => {
                *self = mapped;
                true
            }
            None => false,
        }
    }

    /// Euclidean distance to a point.
    #[must_use]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}
