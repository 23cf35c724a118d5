/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::Instant;

use tracing::{debug, info, trace, warn};

use config::GameConfig;
use domain::color::Palette;
use sim::board::Board;
use sim::event::BoardEvent;
use sim::scheduler::{run_due, Scheduler};
use ui::gamepad::GamepadState;
use ui::input::{InputRouter, InputState, KeyBindings, Routed};
use ui::paint;
use ui::renderer::Renderer;

const STATUS_TOPPED_OUT: &str = "TOPPED OUT   [Esc] Quit";

fn main() {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    match logging::init(&config.logging) {
        Ok(true) => {}
        Ok(false) => eprintln!("Logging disabled."),
        Err(e) => eprintln!("Warning: logging disabled: {e}"),
    }
    if let Some(e) = config_err {
        eprintln!("Warning: {e}");
        eprintln!("Using default settings.");
        warn!(error = %e, "config rejected, using defaults");
    }

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        width = config.board.width,
        height = config.board.height,
        tick_ms = config.timing.tick_ms,
        "starting"
    );

    let mut board = Board::with_seed(config.board.width, config.board.height, seed);
    let palette = Palette::new(&config.colors);
    let mut renderer = Renderer::new(board.grid().width(), board.grid().height());

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut board, &mut renderer, &palette, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(
        ticks = board.ticks(),
        pieces = board.spawned(),
        cells = board.grid().occupied_count(),
        state = ?board.state(),
        "exiting"
    );
    println!();
    println!("Thanks for playing Blockfall!");
    println!("Pieces dropped: {}", board.spawned());
}

fn game_loop(
    board: &mut Board,
    renderer: &mut Renderer,
    palette: &Palette,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let bindings = KeyBindings::from_config(&config.keys);
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let mut router = InputRouter::new();
    let mut scheduler = Scheduler::new(config.tick_interval(), Instant::now());
    let frame_sleep = config.frame_sleep();
    let mut status = String::new();

    debug!(gamepad = gp.connected, interval = ?scheduler.interval(), "input ready");

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(bindings.quit_keys()) || gp.quit_pressed() {
            scheduler.stop();
            info!(slipped = router.slipped(), "quit requested");
            break;
        }

        // ── Input: at most one accepted key per frame ──
        let allowed = board.is_piece_active();
        let requests = kb
            .presses()
            .iter()
            .map(|&code| bindings.direction(code))
            .chain(gp.moves().into_iter().map(Some));
        for request in requests {
            if let Routed::Move(dir) = router.offer(request, allowed) {
                let events = board.move_piece(dir);
                process_events(&events, &mut status);
            }
        }
        router.finish();

        // ── Gravity ──
        let events = run_due(board, &mut scheduler, Instant::now());
        process_events(&events, &mut status);

        paint_frame(renderer, board, palette, &status);

        let nap = scheduler
            .until_due(Instant::now())
            .map_or(frame_sleep, |d| d.min(frame_sleep));
        std::thread::sleep(nap);
    }

    Ok(())
}

/// Log board events and update the status line.
fn process_events(events: &[BoardEvent], status: &mut String) {
    for event in events {
        match event {
            BoardEvent::ToppedOut { shape } => {
                info!(shape = shape.name(), "topped out, halting");
                *status = STATUS_TOPPED_OUT.to_string();
            }
            BoardEvent::MoveRejected { dx } => trace!(dx, "move rejected"),
            BoardEvent::Descended { .. } => trace!(?event, "board"),
            _ => debug!(?event, "board"),
        }
    }
}

/// Paint the latest board changes. Failures are logged and dropped so a
/// bad frame never stops the loop.
fn paint_frame(renderer: &mut Renderer, board: &mut Board, palette: &Palette, status: &str) {
    let changes = match renderer.begin_frame() {
        Ok(true) => board.repaint_all(),
        Ok(false) => board.take_changes(),
        Err(e) => {
            warn!(error = %e, "frame setup failed");
            return;
        }
    };

    let failed = paint::paint_changes(renderer, palette, &changes);
    if failed > 0 {
        warn!(failed, "some cells were not painted");
    }

    if let Err(e) = renderer.present(status) {
        warn!(error = %e, "present failed");
    }
}
