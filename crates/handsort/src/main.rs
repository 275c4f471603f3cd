use clap::Parser;
use handsort::config::{self, Settings};
use handsort::events::AppEvent;
use handsort::game::{FPS, Game, GameError, LogPresenter, Presenter};
use handsort::sys::journal::Journal;
use handsort::sys::narrator::{self, NarrationHandle};
use handsort::sys::runtime;
use handsort::sys::tracker::{self, CaptureError, TrackedFrame};
use pantry::catalog::Catalog;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(version, about = "Sort food into veg and non-veg bins with hand gestures")]
struct Args {
    /// Write a commented default config file and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.write_config {
        let path = config::write_default_config()?;
        println!("{}", path.display());
        return Ok(());
    }

    let settings = config::load_or_default();

    let catalog_path = settings.catalog_path()?;
    let (catalog, catalog_error) = match Catalog::load(&catalog_path) {
        Ok(c) => {
            log::info!("Loaded {} food items from {}", c.len(), catalog_path.display());
            (c, None)
        }
        Err(e) => (
            Catalog::empty(&catalog_path),
            Some(GameError::CatalogUnavailable(format!(
                "{}: {}",
                catalog_path.display(),
                e
            ))),
        ),
    };

    let mut game = Game::new(catalog, settings.rules());
    let mut tracker = match tracker::open(&settings) {
        Ok(t) => Some(t),
        Err(e) => {
            game.fail(e);
            None
        }
    };
    if let Some(e) = catalog_error {
        game.fail(e);
    }

    let journal = match open_journal(&settings) {
        Ok(j) => Some(j),
        Err(e) => {
            log::error!("Playing without a journal: {}", e);
            None
        }
    };

    let (tx, rx) = async_channel::bounded(32);
    let (narration_tx, narration_rx) = async_channel::bounded(narrator::QUEUE_DEPTH);
    let mut narration = NarrationHandle::new(narration_tx, &settings);

    // Start Background Services
    runtime::start_background_services(tx, narration_rx);

    let mut presenter = LogPresenter::default();
    let frame_time = Duration::from_secs(1) / FPS;
    let mut last_frame = Instant::now();
    log::info!("Ready, send 'start' to begin");

    'frames: loop {
        let frame_start = Instant::now();

        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Control(cmd) => {
                    if !game.command(cmd) {
                        break 'frames;
                    }
                }
                AppEvent::ConfigReload => match config::load_settings() {
                    Ok(s) => {
                        game.set_rules(s.rules());
                        narration.configure(&s);
                        log::info!("Settings reloaded, game rules apply from the next start");
                    }
                    Err(e) => log::error!("Keeping current settings: {}", e),
                },
            }
        }

        let capture = match (&mut tracker, game.is_playing()) {
            (Some(t), true) => t.next_frame(),
            (None, true) => Err(CaptureError::Unavailable("no hand tracker".to_string())),
            (_, false) => Ok(TrackedFrame::default()),
        };

        let tick = game.tick(capture, frame_start.duration_since(last_frame));
        last_frame = frame_start;

        if let Some(feedback) = &tick.feedback {
            if let Some(journal) = &journal
                && let Err(e) = journal.record(feedback)
            {
                log::error!("Failed to write {}: {}", journal.path().display(), e);
            }
            narration.announce(feedback);
        }

        presenter.present(&game.view());

        std::thread::sleep(frame_time.saturating_sub(frame_start.elapsed()));
    }

    log::info!("Bye");
    Ok(())
}

fn open_journal(settings: &Settings) -> anyhow::Result<Journal> {
    Ok(Journal::open(settings.journal_path()?)?)
}
