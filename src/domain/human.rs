/// Human controller: held keys → next human state.
///
/// Vertical and horizontal axes resolve independently. Horizontal is
/// evaluated second, so when both axes are active the reported direction is
/// the horizontal one (both axes still move).

use super::entity::{Direction, Human};
use super::geometry::{advance_pulse, Bounds};
use super::keys::KeyState;

pub const PULSE_STEP: f32 = 0.1;

const KEYS_UP: &[&str] = &["w", "arrowup"];
const KEYS_DOWN: &[&str] = &["s", "arrowdown"];
const KEYS_LEFT: &[&str] = &["a", "arrowleft"];
const KEYS_RIGHT: &[&str] = &["d", "arrowright"];

pub fn step(human: &Human, keys: &KeyState, bounds: Bounds) -> Human {
    let mut next = *human;
    let body = &mut next.body;

    if keys.any_held(KEYS_UP) {
        body.y -= body.speed;
        next.direction = Direction::Up;
    } else if keys.any_held(KEYS_DOWN) {
        body.y += body.speed;
        next.direction = Direction::Down;
    }

    if keys.any_held(KEYS_LEFT) {
        body.x -= body.speed;
        next.direction = Direction::Left;
    } else if keys.any_held(KEYS_RIGHT) {
        body.x += body.speed;
        next.direction = Direction::Right;
    }

    (body.x, body.y) = bounds.clamp(body.x, body.y, body.size);
    body.pulse = advance_pulse(body.pulse, PULSE_STEP);
    next
}
