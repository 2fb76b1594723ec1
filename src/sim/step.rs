/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Food check on the cell the head is about to enter
///   2. Movement (grow instead of shift when eating)
///   3. Self-collision
///   4. Food respawn / board-full check
///
/// Every tick is O(n) in the snake length: one body scan for collision,
/// plus the food placement scan on a crowded board.

use tracing::{debug, info};

use super::event::GameEvent;
use super::scores::Score;
use super::world::{Phase, WorldState, DEFAULT_NAME, MAX_NAME_LEN};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState) -> Vec<GameEvent> {
    if world.phase != Phase::Playing || world.paused { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    let ate = resolve_movement(world, &mut events);
    if resolve_self_collision(world, &mut events) { return events; }
    if ate {
        resolve_food_respawn(world, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Movement + growth
// ══════════════════════════════════════════════════════════════

/// Returns whether the food was eaten this tick.
fn resolve_movement(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let next = world.snake.next_head(world.columns, world.rows);
    let ate = world.is_food(next);
    if ate {
        // Growth starts this tick: the tail stays put.
        world.snake.grow(world.rules.growth);
    }

    world.snake.advance(world.columns, world.rows);

    if ate {
        let length = world.snake.target_len();
        world.score = length.saturating_sub(world.start_len) as u32;
        events.push(GameEvent::FoodEaten { x: next.x, y: next.y });
        events.push(GameEvent::LengthChanged { length });
        debug!(tick = world.tick, length, score = world.score, "food eaten");
    }
    ate
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

fn resolve_self_collision(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if !world.snake.head_collides() { return false; }

    let head = world.snake.head();
    world.phase = Phase::GameOver;
    world.anim_tick = 0;
    world.set_message("GAME OVER", 0);
    events.push(GameEvent::SnakeCrashed { x: head.x, y: head.y });
    info!(tick = world.tick, score = world.score, x = head.x, y = head.y, "snake crashed");
    true
}

fn resolve_food_respawn(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.respawn_food() { return; }

    world.phase = Phase::GameOver;
    world.anim_tick = 0;
    world.set_message("BOARD FILLED", 0);
    events.push(GameEvent::BoardFilled);
    info!(tick = world.tick, score = world.score, "board filled");
}

// ══════════════════════════════════════════════════════════════
// End of game
// ══════════════════════════════════════════════════════════════

/// Leave `GameOver`: ask for a name if the score ranks, else show the board.
pub fn finish_game(world: &mut WorldState) {
    if world.phase != Phase::GameOver { return; }
    world.message.clear();
    world.message_timer = 0;
    world.anim_tick = 0;
    if world.board.qualifies(world.score) {
        world.name_input.clear();
        world.phase = Phase::NameEntry;
    } else {
        world.phase = Phase::Scores;
    }
}

/// Drop the current game (or skip recording it) and go back to the title.
pub fn return_to_title(world: &mut WorldState) {
    if world.phase == Phase::Playing {
        info!(tick = world.tick, score = world.score, "game abandoned");
    }
    world.paused = false;
    world.name_input.clear();
    world.message.clear();
    world.message_timer = 0;
    world.anim_tick = 0;
    world.phase = Phase::Title;
}

/// Append a typed character to the pending name.
pub fn push_name_char(world: &mut WorldState, c: char) {
    if world.phase != Phase::NameEntry { return; }
    if c.is_control() || world.name_input.chars().count() >= MAX_NAME_LEN { return; }
    world.name_input.push(c);
}

pub fn pop_name_char(world: &mut WorldState) {
    if world.phase == Phase::NameEntry {
        world.name_input.pop();
    }
}

/// Record the score under the typed name (or the default) and show the board.
/// Returns the rank the entry landed on.
pub fn submit_name(world: &mut WorldState) -> Option<usize> {
    if world.phase != Phase::NameEntry { return None; }
    let trimmed = world.name_input.trim();
    let name = if trimmed.is_empty() { DEFAULT_NAME } else { trimmed };
    let rank = world.board.add(Score::new(name, world.score));
    info!(name, score = world.score, ?rank, "score recorded");
    world.last_rank = rank;
    world.name_input.clear();
    world.phase = Phase::Scores;
    world.anim_tick = 0;
    rank
}
