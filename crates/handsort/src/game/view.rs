use super::{Feedback, Phase};
use crate::gesture::{DropZones, Interaction};
use pantry::catalog::FoodItem;
use pantry::geometry::Point;
use std::time::Duration;

/// Everything a renderer needs to draw one frame.
pub struct FrameView<'a> {
    pub phase: &'a Phase,
    pub score: i64,
    pub time_left: Duration,
    pub interaction: &'a Interaction,
    pub items: &'a [FoodItem],
    /// Screen position of each item in `items`.
    pub slots: Vec<Point>,
    pub zones: &'a DropZones,
    pub banner: Option<&'a Feedback>,
    pub hands_visible: bool,
}

impl FrameView<'_> {
    /// The item following the left hand, if any.
    pub fn dragged(&self) -> Option<(&FoodItem, Point)> {
        if !self.interaction.dragging {
            return None;
        }
        let item = self.items.get(self.interaction.dragged?)?;
        Some((item, self.interaction.drag_pos?))
    }

    pub fn selected(&self) -> Option<&FoodItem> {
        self.items.get(self.interaction.selected)
    }
}

pub trait Presenter {
    fn present(&mut self, view: &FrameView<'_>);
}

/// Headless presenter: reports phase changes and feedback through the log.
#[derive(Debug, Default)]
pub struct LogPresenter {
    last_phase: Option<Phase>,
    last_banner: Option<Feedback>,
    /// Unknown until the first frame of a game.
    hands_visible: Option<bool>,
}

impl LogPresenter {
    /// Returns the new hand visibility when it changed during play.
    fn hand_cue(&mut self, view: &FrameView<'_>) -> Option<bool> {
        if *view.phase != Phase::Playing || self.hands_visible == Some(view.hands_visible) {
            return None;
        }
        self.hands_visible = Some(view.hands_visible);
        self.hands_visible
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, view: &FrameView<'_>) {
        if self.last_phase.as_ref() != Some(view.phase) {
            match view.phase {
                Phase::Playing => log::info!(
                    "{} items to sort, {}s left, score {}",
                    view.items.len(),
                    view.time_left.as_secs(),
                    view.score
                ),
                Phase::GameOver => log::info!("Final score: {}", view.score),
                Phase::Failed(e) => log::error!("Game stopped: {}", e),
                _ => {}
            }
            self.last_phase = Some(view.phase.clone());
            self.hands_visible = None;
        }

        if view.banner != self.last_banner.as_ref() {
            if let Some(fb) = view.banner {
                log::info!("{} {} is {}", fb.verdict(), fb.item, fb.kind);
            }
            self.last_banner = view.banner.cloned();
        }

        match self.hand_cue(view) {
            Some(true) => log::debug!("Hands in view"),
            Some(false) => log::info!("Show your hand to start interacting!"),
            None => {}
        }

        if let Some((item, pos)) = view.dragged() {
            log::trace!("Dragging '{}' at ({:.0}, {:.0})", item.name, pos.x, pos.y);
        }
    }
}
