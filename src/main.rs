/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::KeyCode;
use tracing::{info, trace, warn};

use config::GameConfig;
use sim::save;
use sim::scores::ScoreBoard;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_CONFIRM, KEYS_PAUSE, KEYS_QUIT, KEYS_SCORES};
use ui::renderer::{grid_size_for, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "checksnake", version, about = "Snake on a grid of checkboxes")]
struct Args {
    /// Path to configuration file (default: config.toml next to the binary or in CWD)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Import scores from a share URL (`...?s=...`) into the local board
    #[arg(long, value_name = "URL")]
    scores: Option<String>,

    /// Board width in cells (0 = fit terminal)
    #[arg(long)]
    columns: Option<u16>,

    /// Board height in cells (0 = fit terminal)
    #[arg(long)]
    rows: Option<u16>,

    /// Seed for food placement, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the stored share URL and exit
    #[arg(long)]
    print_url: bool,
}

/// Everything the loop needs besides the world and the terminal.
struct Session {
    config: GameConfig,
    scores_path: PathBuf,
}

fn main() {
    let args = Args::parse();

    let mut config = GameConfig::load(args.config.as_deref());
    if let Some(c) = args.columns { config.grid.columns = c; }
    if let Some(r) = args.rows { config.grid.rows = r; }

    let scores_path = save::resolve(&config.scores.file);

    if args.print_url {
        match save::load_url(&scores_path) {
            Some(url) => println!("{url}"),
            None => eprintln!("No scores saved yet ({})", scores_path.display()),
        }
        return;
    }

    let log_path = config.log.file.as_deref().map(save::resolve);
    if let Err(e) = logging::init(log_path.as_deref(), &config.log.filter) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let capacity = config.scores.capacity;
    let mut board = save::load_board(&scores_path, capacity);
    if let Some(url) = &args.scores {
        import_scores(&mut board, url, &scores_path, &config);
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let (columns, rows) = board_size(&config, renderer.size());
    let mut world = WorldState::new(columns, rows, config.rules.clone(), board, args.seed);
    info!(columns, rows, seed = ?args.seed, "checksnake started");

    let session = Session { config, scores_path };
    let result = game_loop(&mut world, &mut renderer, &session);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Checkbox Snake!");
    println!("Final Score: {}", world.score);
    if !world.board.is_empty() {
        if let Ok(url) = world.board.to_url(&session.config.scores.base_url) {
            println!("Share your scores: {url}");
        }
    }
}

fn import_scores(board: &mut ScoreBoard, url: &str, path: &Path, config: &GameConfig) {
    let imported = match ScoreBoard::try_from_url(url, board.capacity()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Warning: ignoring --scores: {e}");
            return;
        }
    };
    board.merge(&imported);
    if let Err(e) = save::save_board(path, board, &config.scores.base_url) {
        eprintln!("Warning: {e}");
    }
}

/// Configured size per axis, or the terminal-derived size where it is 0.
fn board_size(config: &GameConfig, term: (u16, u16)) -> (i32, i32) {
    let (fit_w, fit_h) = grid_size_for(term.0, term.1);
    let columns = if config.grid.columns == 0 { fit_w } else { config.grid.columns as i32 };
    let rows = if config.grid.rows == 0 { fit_h } else { config.grid.rows as i32 };
    (columns, rows)
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&session.config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(session.config.rules.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        if renderer.poll_resize()? {
            let (columns, rows) = board_size(&session.config, renderer.size());
            if (columns, rows) != (world.columns, world.rows) {
                info!(columns, rows, "board resized");
                world.resize(columns, rows);
            }
        }

        if handle_meta(world, &kb, &gp, session) {
            break;
        }

        // Steering is read every frame; the snake applies it on its next move.
        if world.phase == Phase::Playing && !world.paused {
            if let Some(dir) = kb.steering().or_else(|| gp.steering()) {
                world.snake.steer(dir);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            world.anim_tick = world.anim_tick.wrapping_add(1);
            if world.phase == Phase::Playing {
                for event in step::step(world) {
                    trace!(?event, "step event");
                }
            }
            world.tick_message();
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Phase-specific keys. Returns true when the player quits.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState, session: &Session) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match world.phase {
        // ── Title Screen ──
        Phase::Title => {
            if confirm {
                start_game(world);
            } else if kb.any_pressed(KEYS_SCORES) {
                world.phase = Phase::Scores;
                world.last_rank = None;
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── Playing ──
        Phase::Playing => {
            if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
                world.paused = !world.paused;
            } else if esc {
                step::return_to_title(world);
            }
        }

        // ── Game Over ──
        Phase::GameOver => {
            if confirm {
                step::finish_game(world);
            } else if esc {
                step::return_to_title(world);
            }
        }

        // ── Name Entry ──
        Phase::NameEntry => {
            for c in kb.typed_chars() {
                step::push_name_char(world, c);
            }
            for _ in 0..kb.backspaces() {
                step::pop_name_char(world);
            }
            if kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                if step::submit_name(world).is_some() {
                    persist_board(world, session);
                }
            } else if esc {
                world.name_input.clear();
                world.phase = Phase::Scores;
            }
        }

        // ── Scores ──
        Phase::Scores => {
            if confirm {
                start_game(world);
            } else if esc {
                step::return_to_title(world);
            }
        }
    }

    false
}

fn start_game(world: &mut WorldState) {
    world.start();
    info!(columns = world.columns, rows = world.rows, "game started");
}

fn persist_board(world: &mut WorldState, session: &Session) {
    match save::save_board(&session.scores_path, &world.board, &session.config.scores.base_url) {
        Ok(_) => world.set_message("Scores saved", 0),
        Err(e) => {
            warn!(error = %e, "could not save scores");
            world.set_message("Could not save scores", 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_all_flags() {
        let args = Args::try_parse_from([
            "checksnake", "--config", "c.toml", "--scores", "http://x/?s=1",
            "--columns", "20", "--rows", "10", "--seed", "9", "--print-url",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert_eq!(args.scores.as_deref(), Some("http://x/?s=1"));
        assert_eq!((args.columns, args.rows, args.seed), (Some(20), Some(10), Some(9)));
        assert!(args.print_url);
    }

    #[test]
    fn zero_axis_fits_the_terminal() {
        let mut config = GameConfig::default();
        assert_eq!(board_size(&config, (80, 24)), (25, 19));
        config.grid.columns = 12;
        assert_eq!(board_size(&config, (80, 24)), (12, 19));
        config.grid.rows = 4;
        assert_eq!(board_size(&config, (80, 24)), (12, 4));
    }
}
