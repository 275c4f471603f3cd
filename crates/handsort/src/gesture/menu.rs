use super::{FULL_TURN, MENU_RADIUS};
use pantry::geometry::Point;

/// Items laid out evenly on a circle around a movable center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuGeometry {
    pub center: Point,
    pub angle_offset: f64,
    pub count: usize,
    pub radius: f64,
}

impl MenuGeometry {
    pub fn new(center: Point, angle_offset: f64, count: usize) -> Self {
        Self {
            center,
            angle_offset,
            count,
            radius: MENU_RADIUS,
        }
    }

    pub fn slot_angle(&self, index: usize) -> f64 {
        FULL_TURN * index as f64 / self.count as f64 + self.angle_offset
    }

    pub fn slot_position(&self, index: usize) -> Point {
        let angle = self.slot_angle(index);
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }

    pub fn slot_positions(&self) -> Vec<Point> {
        (0..self.count).map(|i| self.slot_position(i)).collect()
    }

    /// Index of the slot closest to `pointer`; the lowest index wins a tie.
    pub fn nearest_slot(&self, pointer: Point) -> Option<usize> {
        (0..self.count).min_by(|&a, &b| {
            pointer
                .distance_squared(self.slot_position(a))
                .total_cmp(&pointer.distance_squared(self.slot_position(b)))
        })
    }
}
