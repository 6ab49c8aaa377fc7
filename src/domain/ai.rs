/// Pursuer AI: vision-driven chase with continuous rotation.
///
/// Per frame:
///   1. **Perceive**: vision cone check against the target's current position.
///   2. **Decide & move**
///      - *Hold*: target seen and within contact range. Stay put, face it exactly.
///      - *Track*: target seen. Turn toward it (bounded by `rotation_speed`,
///        snapping once close) and advance.
///      - *Patrol*: target unseen. Advance along the current rotation.
///   3. **Walls**: a proposed position outside the bounds reflects the
///      rotation by 180°; the position is clamped.
///   4. **Obstacles**: a move vetoed by the collision resolver triggers a
///      random turn in [90°, 270°]. Boxes, other pursuers and an unseen
///      target block; a tracked target does not, so the chase can close
///      into contact range and the next frame holds.
///   5. **Pulse**: always advances.
///
/// Hold takes priority over walls and obstacles for that frame.

use std::f32::consts::{FRAC_PI_2, PI};

use rand::Rng;

use super::collision;
use super::entity::{Body, Human, Obstacle, Pursuer};
use super::geometry::{advance_pulse, bearing, distance, wrap_angle, Bounds};
use super::vision::{is_within_cone, VisionState};

/// Different from the human's step so the two pulses drift apart.
pub const PULSE_STEP: f32 = 0.08;

/// Within this many radians of the bearing, tracking snaps straight onto it.
pub const SNAP_THRESHOLD: f32 = 0.1;

/// What the pursuer decided this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Hold,
    Track,
    Patrol,
}

/// Full result of one AI step, including what happened along the way.
#[derive(Clone, Copy, Debug)]
pub struct AiStep {
    pub pursuer: Pursuer,
    pub vision: VisionState,
    pub mode: Mode,
    pub bounced: bool,
    pub deflected: bool,
}

/// Advance one pursuer by a frame. See module docs for the state machine.
pub fn step<R: Rng>(
    pursuer: &Pursuer,
    target: &Human,
    vision: &VisionState,
    bounds: Bounds,
    obstacles: &[Obstacle],
    rng: &mut R,
) -> (Pursuer, VisionState) {
    let out = step_detailed(pursuer, target, vision, bounds, obstacles, &[], rng);
    (out.pursuer, out.vision)
}

/// `step` with the other pursuers' bodies as extra blockers, reporting the
/// chosen mode and any bounce or deflection.
pub fn step_detailed<R: Rng>(
    pursuer: &Pursuer,
    target: &Human,
    vision: &VisionState,
    bounds: Bounds,
    obstacles: &[Obstacle],
    peers: &[Body],
    rng: &mut R,
) -> AiStep {
    let mut next = *pursuer;
    let (ax, ay) = pursuer.body.pos();
    let (tx, ty) = target.body.pos();

    // ── 1. Perceive ──
    let can_see = is_within_cone(
        (ax, ay),
        Some(pursuer.rotation),
        (tx, ty),
        vision.cone_angle,
        vision.vision_distance,
    );
    let next_vision = vision.with_sight(can_see);

    let to_target = bearing(ax, ay, tx, ty);
    let dist = distance(ax, ay, tx, ty);
    let contact = pursuer.body.size + target.body.size;

    next.body.pulse = advance_pulse(pursuer.body.pulse, PULSE_STEP);

    // ── 2a. Hold: face the target, no translation ──
    if can_see && dist < contact {
        next.rotation = wrap_angle(to_target);
        (next.body.x, next.body.y) = bounds.clamp(ax, ay, pursuer.body.size);
        return AiStep {
            pursuer: next,
            vision: next_vision,
            mode: Mode::Hold,
            bounced: false,
            deflected: false,
        };
    }

    // ── 2b/2c. Track or patrol ──
    let mode = if can_see {
        next.rotation = turn_toward(pursuer.rotation, to_target, pursuer.rotation_speed);
        Mode::Track
    } else {
        Mode::Patrol
    };

    let speed = pursuer.body.speed;
    let size = pursuer.body.size;
    let mut px = ax + next.rotation.cos() * speed;
    let mut py = ay + next.rotation.sin() * speed;

    // ── 3. Walls ──
    let bounced = bounds.is_outside(px, py, size);
    if bounced {
        next.rotation = wrap_angle(next.rotation + PI);
        (px, py) = bounds.clamp(px, py, size);
    }

    // ── 4. Obstacles and bodies ──
    let target_blocks = mode != Mode::Track;
    let blockers: Vec<Body> = peers.iter()
        .copied()
        .chain(std::iter::once(target.body).filter(|_| target_blocks))
        // A body already overlapping never vetoes, so the two can separate
        .filter(|b| !collision::circle_hits_circle(ax, ay, size, b.x, b.y, b.size))
        .collect();
    let (rx, ry) = collision::resolve(px, py, &pursuer.body, obstacles, &blockers);
    let deflected = (rx, ry) != (px, py);
    if deflected {
        let offset = rng.gen_range(FRAC_PI_2..=3.0 * FRAC_PI_2);
        next.rotation = wrap_angle(next.rotation + offset);
    }

    (next.body.x, next.body.y) = bounds.clamp(rx, ry, size);

    AiStep { pursuer: next, vision: next_vision, mode, bounced, deflected }
}

/// Rotate `current` toward `goal` by at most `max_step`, snapping once within
/// `SNAP_THRESHOLD` (or within one step) to avoid oscillating around it.
pub fn turn_toward(current: f32, goal: f32, max_step: f32) -> f32 {
    let diff = wrap_angle(goal - current);
    if diff.abs() < SNAP_THRESHOLD || diff.abs() <= max_step {
        return wrap_angle(goal);
    }
    wrap_angle(current + max_step * diff.signum())
}
