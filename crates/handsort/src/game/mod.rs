use crate::gesture::{DropEvent, DropZones, Interaction, Screen};
use crate::sys::tracker::{CaptureError, TrackedFrame};
use pantry::catalog::{Catalog, FoodItem};
use pantry::control::ControlCommand;
use std::time::Duration;
use thiserror::Error;

pub mod scoring;
pub mod view;

pub use scoring::{Feedback, Scoreboard};
pub use view::{FrameView, LogPresenter, Presenter};

pub const FPS: u32 = 30;
pub const MAX_CAPTURE_FAILURES: u32 = 90; // ~3s of consecutive failed frames
pub const BANNER_DURATION: Duration = Duration::from_millis(1500);

/// Failures that end the session until the program is restarted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Hand tracker unavailable: {0}")]
    TrackerUnavailable(String),
    #[error("Camera failed {attempts} frames in a row")]
    CaptureFailed { attempts: u32 },
    #[error("Food catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
    Failed(GameError),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::GameOver => "game over",
            Phase::Failed(_) => "error",
        }
    }
}

/// What the frame loop has to forward after a tick.
#[derive(Debug, Default)]
pub struct Tick {
    pub feedback: Option<Feedback>,
    pub finished: Option<GameSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: i64,
    pub correct: u32,
    pub incorrect: u32,
}

/// Per-game settings; replaced values take effect at the next start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub duration: Duration,
    pub screen: Screen,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            screen: Screen::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Banner {
    feedback: Feedback,
    remaining: Duration,
}

pub struct Game {
    phase: Phase,
    rules: Rules,
    pending_rules: Option<Rules>,
    catalog: Catalog,
    pool: Vec<FoodItem>,
    interaction: Interaction,
    scoreboard: Scoreboard,
    time_left: Duration,
    zones: DropZones,
    banner: Option<Banner>,
    hands_visible: bool,
    capture_failures: u32,
}

impl Game {
    pub fn new(catalog: Catalog, rules: Rules) -> Self {
        Self {
            phase: Phase::Menu,
            rules,
            pending_rules: None,
            pool: catalog.items().to_vec(),
            catalog,
            interaction: Interaction::new(rules.screen.center()),
            scoreboard: Scoreboard::default(),
            time_left: rules.duration,
            zones: DropZones::for_screen(rules.screen),
            banner: None,
            hands_visible: false,
            capture_failures: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn pool(&self) -> &[FoodItem] {
        &self.pool
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn score(&self) -> i64 {
        self.scoreboard.score
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.scoreboard.score,
            correct: self.scoreboard.correct,
            incorrect: self.scoreboard.incorrect,
        }
    }

    pub fn set_rules(&mut self, rules: Rules) {
        self.pending_rules = Some(rules);
    }

    /// Enters the terminal error phase.
    pub fn fail(&mut self, error: GameError) {
        log::error!("{}", error);
        self.phase = Phase::Failed(error);
    }

    /// Applies a control command; returns `false` once the game should shut down.
    pub fn command(&mut self, cmd: ControlCommand) -> bool {
        use ControlCommand::*;

        match (&self.phase, cmd) {
            (_, Quit) => return false,
            (Phase::Failed(_), _) => {
                log::warn!("Ignoring '{}': restart required", cmd);
            }
            (Phase::Menu | Phase::GameOver, Start) => self.start(),
            (Phase::Playing, Pause) => self.phase = Phase::Paused,
            (Phase::Paused, Resume) => self.phase = Phase::Playing,
            (Phase::Playing | Phase::Paused | Phase::GameOver, Stop) => self.phase = Phase::Menu,
            (phase, cmd) => {
                log::debug!("'{}' has no effect in {}", cmd, phase.name());
                return true;
            }
        }
        log::info!("Phase: {}", self.phase.name());
        true
    }

    fn start(&mut self) {
        if let Some(rules) = self.pending_rules.take() {
            self.rules = rules;
            self.zones = DropZones::for_screen(rules.screen);
        }
        if let Err(e) = self.catalog.reload() {
            log::warn!(
                "Keeping previous food items, reloading {} failed: {}",
                self.catalog.path().display(),
                e
            );
        }

        self.pool = self.catalog.items().to_vec();
        self.interaction = Interaction::new(self.rules.screen.center());
        self.scoreboard = Scoreboard::default();
        self.time_left = self.rules.duration;
        self.banner = None;
        self.capture_failures = 0;
        self.phase = Phase::Playing;

        if self.pool.is_empty() {
            log::warn!("No food items to sort in {}", self.catalog.path().display());
            self.phase = Phase::GameOver;
        }
    }

    /// Advances one frame. `capture` is the tracker's result for this frame and `elapsed` the
    /// wall time since the previous frame. Outside of play the capture is ignored.
    pub fn tick(
        &mut self,
        capture: Result<TrackedFrame, CaptureError>,
        elapsed: Duration,
    ) -> Tick {
        let mut tick = Tick::default();
        self.expire_banner(elapsed);

        if !self.is_playing() {
            return tick;
        }

        match capture {
            Ok(frame) => {
                self.capture_failures = 0;
                tick.feedback = self.interpret(&frame);
            }
            Err(CaptureError::Transient(reason)) => {
                self.capture_failures += 1;
                log::warn!("Skipping frame: {}", reason);
                if self.capture_failures >= MAX_CAPTURE_FAILURES {
                    self.fail(GameError::CaptureFailed {
                        attempts: self.capture_failures,
                    });
                    return tick;
                }
            }
            Err(CaptureError::Unavailable(reason)) => {
                self.fail(GameError::TrackerUnavailable(reason));
                return tick;
            }
            Err(CaptureError::Exhausted) => {
                log::info!("Hand recording finished");
                self.phase = Phase::GameOver;
            }
        }

        if self.is_playing() {
            self.time_left = self.time_left.saturating_sub(elapsed);
            if self.time_left.is_zero() {
                log::info!("Time is up");
                self.phase = Phase::GameOver;
            }
        }

        if self.phase == Phase::GameOver {
            let summary = self.summary();
            log::info!(
                "Game over: score {} ({} correct, {} incorrect)",
                summary.score,
                summary.correct,
                summary.incorrect
            );
            tick.finished = Some(summary);
        }
        tick
    }

    fn interpret(&mut self, frame: &TrackedFrame) -> Option<Feedback> {
        self.hands_visible = !frame.hands.is_empty();

        let outcome = match self.interaction.interpret_raw(
            &frame.hands,
            self.rules.screen,
            self.pool.len(),
            &self.zones,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Ignoring malformed hand data: {}", e);
                return None;
            }
        };

        if outcome.selection_changed
            && let Some(item) = self.pool.get(self.interaction.selected)
        {
            log::debug!("Selected '{}'", item.name);
        }
        if let Some(idx) = outcome.cancelled {
            log::debug!("Drag of item {} cancelled, left hand lost", idx);
        }
        outcome.drop.and_then(|drop| self.settle(drop))
    }

    fn settle(&mut self, drop: DropEvent) -> Option<Feedback> {
        let Some(zone) = drop.zone else {
            log::debug!("Item {} released outside the bins", drop.item);
            return None;
        };
        if drop.item >= self.pool.len() {
            log::warn!("Dropped item {} is not in the pool", drop.item);
            return None;
        }

        let item = self.pool.remove(drop.item);
        let feedback = self.scoreboard.record(&item, zone);
        log::info!(
            "{} '{}' ({}) dropped in {}, score {}",
            feedback.verdict(),
            feedback.item,
            feedback.kind,
            feedback.zone,
            feedback.score
        );

        self.interaction.selected = self
            .interaction
            .selected
            .min(self.pool.len().saturating_sub(1));
        self.banner = Some(Banner {
            feedback: feedback.clone(),
            remaining: BANNER_DURATION,
        });
        if self.pool.is_empty() {
            self.phase = Phase::GameOver;
        }
        Some(feedback)
    }

    fn expire_banner(&mut self, elapsed: Duration) {
        if let Some(banner) = &mut self.banner {
            banner.remaining = banner.remaining.saturating_sub(elapsed);
            if banner.remaining.is_zero() {
                self.banner = None;
            }
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            phase: &self.phase,
            score: self.scoreboard.score,
            time_left: self.time_left,
            interaction: &self.interaction,
            items: &self.pool,
            slots: self.interaction.menu(self.pool.len()).slot_positions(),
            zones: &self.zones,
            banner: self.banner.as_ref().map(|b| &b.feedback),
            hands_visible: self.hands_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::hand::fixtures::posed;
    use crate::gesture::{INDEX_TIP, PIP_OFFSET, RawHand};
    use pantry::catalog::FoodKind;
    use pantry::geometry::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn catalog_with(items: &[(&str, FoodKind)]) -> Catalog {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!("handsort-game-{}", std::process::id()));
        let path = dir.join(format!("{}.json", NEXT.fetch_add(1, Ordering::Relaxed)));
        let _ = fs_err::remove_file(&path);
        let mut catalog = Catalog::load(&path).unwrap();
        for (name, kind) in items {
            catalog
                .add(FoodItem::new(*name, format!("{name}.png"), *kind))
                .unwrap();
        }
        catalog
    }

    fn raw(label: &str, pts: [Point; 21]) -> RawHand {
        RawHand {
            handedness: Some(label.to_string()),
            landmarks: pts.iter().map(|p| [p.x, p.y]).collect(),
        }
    }

    /// Left fist with the index tip at pixel `px`.
    fn grab_at(px: Point) -> TrackedFrame {
        let screen = Screen::default();
        let mut pts = posed([false; 4]);
        let tip = Point::new(px.x / screen.width, px.y / screen.height);
        pts[INDEX_TIP - PIP_OFFSET] = Point::new(tip.x, tip.y - 0.05);
        pts[INDEX_TIP] = tip;
        TrackedFrame {
            hands: vec![raw("Left", pts)],
        }
    }

    fn release() -> TrackedFrame {
        TrackedFrame {
            hands: vec![raw("Left", posed([true; 4]))],
        }
    }

    fn no_hands() -> TrackedFrame {
        TrackedFrame::default()
    }

    const FRAME: Duration = Duration::from_millis(33);

    fn started(items: &[(&str, FoodKind)]) -> Game {
        let mut game = Game::new(catalog_with(items), Rules::default());
        assert!(game.command(ControlCommand::Start));
        game
    }

    #[test]
    fn test_single_item_drop_ends_game() {
        for zone_is_veg in [true, false] {
            let mut game = started(&[("Carrot", FoodKind::Veg)]);
            let zones = DropZones::default();
            let target = if zone_is_veg {
                zones.veg.center()
            } else {
                zones.non_veg.center()
            };

            game.tick(Ok(grab_at(target)), FRAME);
            assert!(game.interaction().dragging);

            let tick = game.tick(Ok(release()), FRAME);
            let feedback = tick.feedback.unwrap();
            assert_eq!(feedback.correct, zone_is_veg);
            assert!(game.pool().is_empty());
            assert_eq!(*game.phase(), Phase::GameOver);
            assert_eq!(tick.finished.unwrap().score, feedback.score);
        }
    }

    #[test]
    fn test_scores_accumulate_across_drops() {
        let mut game = started(&[("Carrot", FoodKind::Veg), ("Fish", FoodKind::NonVeg)]);
        let zones = DropZones::default();

        // selection defaults to the first item
        game.tick(Ok(grab_at(zones.veg.center())), FRAME);
        let first = game.tick(Ok(release()), FRAME).feedback.unwrap();
        assert_eq!(first.item.as_str(), "Carrot");
        assert_eq!(first.score, 10);

        game.tick(Ok(grab_at(zones.veg.center())), FRAME);
        let second = game.tick(Ok(release()), FRAME).feedback.unwrap();
        assert_eq!(second.item.as_str(), "Fish");
        assert!(!second.correct);
        assert_eq!(second.score, 5);
        assert_eq!(*game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_drop_outside_bins_keeps_item() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.tick(Ok(grab_at(Point::new(900.0, 600.0))), FRAME);
        let tick = game.tick(Ok(release()), FRAME);
        assert!(tick.feedback.is_none());
        assert_eq!(game.pool().len(), 1);
        assert_eq!(game.score(), 0);
        assert!(game.is_playing());
    }

    #[test]
    fn test_lost_hand_cancels_drag() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.tick(Ok(grab_at(DropZones::default().veg.center())), FRAME);
        game.tick(Ok(no_hands()), FRAME);
        let tick = game.tick(Ok(release()), FRAME);
        assert!(tick.feedback.is_none());
        assert_eq!(game.pool().len(), 1);
    }

    #[test]
    fn test_countdown_ends_game() {
        let mut game = Game::new(
            catalog_with(&[("Carrot", FoodKind::Veg), ("Rice", FoodKind::Veg)]),
            Rules {
                duration: Duration::from_millis(50),
                ..Rules::default()
            },
        );
        game.command(ControlCommand::Start);
        assert!(game.tick(Ok(no_hands()), FRAME).finished.is_none());
        let tick = game.tick(Ok(no_hands()), FRAME);
        assert!(tick.finished.is_some());
        assert_eq!(*game.phase(), Phase::GameOver);
        assert!(game.time_left().is_zero());
    }

    #[test]
    fn test_pause_freezes_countdown() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.command(ControlCommand::Pause);
        let before = game.time_left();
        game.tick(Ok(no_hands()), Duration::from_secs(5));
        assert_eq!(game.time_left(), before);
        assert_eq!(*game.phase(), Phase::Paused);

        game.command(ControlCommand::Resume);
        game.tick(Ok(no_hands()), Duration::from_secs(5));
        assert_eq!(game.time_left(), before - Duration::from_secs(5));
    }

    #[test]
    fn test_repeated_capture_failures_are_terminal() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        for _ in 0..MAX_CAPTURE_FAILURES - 1 {
            game.tick(Err(CaptureError::Transient("busy".into())), FRAME);
            assert!(game.is_playing());
        }
        game.tick(Err(CaptureError::Transient("busy".into())), FRAME);
        assert_eq!(
            *game.phase(),
            Phase::Failed(GameError::CaptureFailed {
                attempts: MAX_CAPTURE_FAILURES
            })
        );

        // only quitting is possible now
        assert!(game.command(ControlCommand::Start));
        assert!(matches!(game.phase(), Phase::Failed(_)));
        assert!(!game.command(ControlCommand::Quit));
    }

    #[test]
    fn test_unavailable_tracker_is_terminal() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.tick(Err(CaptureError::Unavailable("camera unplugged".into())), FRAME);
        assert_eq!(
            *game.phase(),
            Phase::Failed(GameError::TrackerUnavailable("camera unplugged".to_string()))
        );

        assert!(game.command(ControlCommand::Start));
        assert!(game.command(ControlCommand::Resume));
        assert!(matches!(game.phase(), Phase::Failed(_)));
        assert!(!game.is_playing());
        assert!(!game.command(ControlCommand::Quit));
    }

    #[test]
    fn test_failure_at_startup_blocks_start() {
        let mut game = Game::new(catalog_with(&[("Carrot", FoodKind::Veg)]), Rules::default());
        game.fail(GameError::TrackerUnavailable("camera_on is false".to_string()));

        assert!(game.command(ControlCommand::Start));
        assert!(matches!(
            game.phase(),
            Phase::Failed(GameError::TrackerUnavailable(_))
        ));
        let tick = game.tick(Ok(grab_at(DropZones::default().veg.center())), FRAME);
        assert!(tick.feedback.is_none());
        assert!(!game.interaction().dragging);
        assert!(!game.command(ControlCommand::Quit));
    }

    #[test]
    fn test_successful_frame_resets_failure_count() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        for _ in 0..MAX_CAPTURE_FAILURES - 1 {
            game.tick(Err(CaptureError::Transient("busy".into())), FRAME);
        }
        game.tick(Ok(no_hands()), FRAME);
        game.tick(Err(CaptureError::Transient("busy".into())), FRAME);
        assert!(game.is_playing());
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.tick(Ok(grab_at(DropZones::default().veg.center())), FRAME);
        let before = game.interaction().clone();

        let broken = TrackedFrame {
            hands: vec![RawHand {
                handedness: None,
                landmarks: vec![[0.5, 0.5]; 21],
            }],
        };
        let tick = game.tick(Ok(broken), FRAME);
        assert!(tick.feedback.is_none());
        assert_eq!(*game.interaction(), before);
    }

    #[test]
    fn test_empty_catalog_is_over_at_once() {
        let game = started(&[]);
        assert_eq!(*game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_banner_expires() {
        let mut game = started(&[("Carrot", FoodKind::Veg), ("Rice", FoodKind::Veg)]);
        game.tick(Ok(grab_at(DropZones::default().veg.center())), FRAME);
        game.tick(Ok(release()), FRAME);
        assert!(game.view().banner.is_some());
        game.tick(Ok(no_hands()), BANNER_DURATION);
        assert!(game.view().banner.is_none());
    }

    #[test]
    fn test_stop_returns_to_menu_and_start_resets() {
        let mut game = started(&[("Carrot", FoodKind::Veg), ("Rice", FoodKind::Veg)]);
        game.tick(Ok(grab_at(DropZones::default().veg.center())), FRAME);
        game.tick(Ok(release()), FRAME);
        assert_eq!(game.pool().len(), 1);

        game.command(ControlCommand::Stop);
        assert_eq!(*game.phase(), Phase::Menu);
        game.command(ControlCommand::Start);
        assert_eq!(game.pool().len(), 2);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_new_rules_apply_at_next_start() {
        let mut game = started(&[("Carrot", FoodKind::Veg)]);
        game.set_rules(Rules {
            duration: Duration::from_secs(10),
            ..Rules::default()
        });
        assert_eq!(game.time_left(), Duration::from_secs(60));
        game.command(ControlCommand::Stop);
        game.command(ControlCommand::Start);
        assert_eq!(game.time_left(), Duration::from_secs(10));
    }
}
