//! Turns the hands seen in one frame into menu, drag and drop intents.
//!
//! The right hand steers the circular menu: an open palm moves the menu to the wrist, wrist
//! rotation spins it and the index fingertip picks the nearest item. The left hand carries the
//! picked item: a closed fist drags it, opening the hand drops it on whatever bin lies under the
//! fingertip.

use super::hand::{GestureError, HandLandmarks, Handedness, RawHand};
use super::menu::MenuGeometry;
use super::zones::DropZones;
use super::Screen;
use pantry::catalog::FoodKind;
use pantry::geometry::Point;

/// An item released by the left hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEvent {
    pub item: usize,
    pub position: Point,
    /// `None` when released outside both bins.
    pub zone: Option<FoodKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutcome {
    pub drop: Option<DropEvent>,
    /// Item whose drag ended because the left hand left the frame.
    pub cancelled: Option<usize>,
    pub selection_changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub selected: usize,
    pub angle_offset: f64,
    pub menu_center: Point,
    pub dragging: bool,
    pub dragged: Option<usize>,
    pub drag_pos: Option<Point>,
    pub last_left: Option<HandLandmarks>,
    pub last_right: Option<HandLandmarks>,
}

impl Interaction {
    pub fn new(menu_center: Point) -> Self {
        Self {
            selected: 0,
            angle_offset: 0.0,
            menu_center,
            dragging: false,
            dragged: None,
            drag_pos: None,
            last_left: None,
            last_right: None,
        }
    }

    pub fn menu(&self, item_count: usize) -> MenuGeometry {
        MenuGeometry::new(self.menu_center, self.angle_offset, item_count)
    }

    /// Validates every hand before touching any state, so a malformed frame leaves the
    /// interaction exactly as it was. With several hands of one side the last one wins.
    pub fn interpret_raw(
        &mut self,
        hands: &[RawHand],
        screen: Screen,
        item_count: usize,
        zones: &DropZones,
    ) -> Result<FrameOutcome, GestureError> {
        let hands = hands
            .iter()
            .map(|raw| HandLandmarks::from_raw(raw, screen))
            .collect::<Result<Vec<_>, _>>()?;

        let pick = |side: Handedness| hands.iter().rev().find(|h| h.handedness == side);
        Ok(self.interpret(
            pick(Handedness::Left),
            pick(Handedness::Right),
            item_count,
            zones,
        ))
    }

    pub fn interpret(
        &mut self,
        left: Option<&HandLandmarks>,
        right: Option<&HandLandmarks>,
        item_count: usize,
        zones: &DropZones,
    ) -> FrameOutcome {
        // a grab has to be held every frame to keep dragging
        self.dragging = false;

        let mut outcome = FrameOutcome::default();

        if let Some(hand) = right.filter(|h| h.is_palm_open()) {
            outcome.selection_changed = self.steer_menu(hand, item_count);
        }

        match left {
            Some(hand) if hand.is_grabbing() => {
                self.dragging = true;
                self.dragged = Some(self.selected);
                self.drag_pos = Some(hand.index_tip_px());
                self.last_left = Some(hand.clone());
            }
            Some(_) => {
                if let (Some(item), Some(position)) = (self.dragged.take(), self.drag_pos.take()) {
                    outcome.drop = Some(DropEvent {
                        item,
                        position,
                        zone: zones.classify(position),
                    });
                }
            }
            None => {
                if let Some(item) = self.dragged.take() {
                    self.drag_pos = None;
                    outcome.cancelled = Some(item);
                }
            }
        }

        outcome
    }

    fn steer_menu(&mut self, hand: &HandLandmarks, item_count: usize) -> bool {
        // inverted so the menu turns the way the wrist does on a mirrored feed
        self.angle_offset = -hand.wrist_angle();
        self.menu_center = hand.wrist_px();
        self.last_right = Some(hand.clone());

        match self.menu(item_count).nearest_slot(hand.index_tip_px()) {
            Some(idx) if idx != self.selected => {
                self.selected = idx;
                true
            }
            _ => false,
        }
    }
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(Screen::default().center())
    }
}
