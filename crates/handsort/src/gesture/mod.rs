use std::f64::consts::PI;

pub mod hand;
pub mod interpreter;
pub mod menu;
pub mod zones;

pub use hand::{GestureError, HandLandmarks, Handedness, RawHand};
pub use interpreter::{DropEvent, FrameOutcome, Interaction};
pub use menu::MenuGeometry;
pub use zones::DropZones;

pub const LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const FINGERTIPS: [usize; 4] = [8, 12, 16, 20]; // index, middle, ring, pinky
pub const PIP_OFFSET: usize = 2; // tip - 2 is the PIP joint

pub const MENU_RADIUS: f64 = 150.0; // item orbital radius, px
pub const FULL_TURN: f64 = 2.0 * PI;

pub const DROP_ZONE_SIZE: f64 = 180.0;
pub const DROP_ZONE_MARGIN: f64 = 40.0; // distance from the left screen edge
pub const DROP_ZONE_GAP: f64 = 20.0; // distance of each zone from the vertical midline

/// Size of the play area that normalized landmarks are projected onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub width: f64,
    pub height: f64,
}

impl Screen {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> pantry::geometry::Point {
        pantry::geometry::Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
