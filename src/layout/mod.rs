//! Tree layout: assigns drawable `(x, y)` coordinates to every node.

mod reingold_tilford;

use serde::{Deserialize, Serialize};

pub use reingold_tilford::reingold_tilford;

/// Attribute holding the final horizontal coordinate.
pub const ATTR_X: &str = "x";
/// Attribute holding the final vertical coordinate.
pub const ATTR_Y: &str = "y";
/// Working attribute: offset applied to the node's descendants.
pub const ATTR_MOD: &str = "mod";
/// Working attribute: total shift applied while separating subtrees.
pub const ATTR_SHIFT: &str = "shift";

/// Separation parameters of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Horizontal distance between adjacent siblings
    pub sibling_separation: f64,
    /// Minimum horizontal distance between neighbouring subtrees below the sibling level
    pub subtree_separation: f64,
    /// Vertical distance between levels
    pub level_separation: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            subtree_separation: 1.0,
            level_separation: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

/// Extent of a computed layout. Use `min_x` to derive a corrective offset when a
/// non-negative coordinate space is needed; the layout never clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
