/// WorldState: the complete snapshot of a running simulation.
///
/// Owns the human, every pursuer and its vision state (index-aligned), and
/// the static obstacle set. Entities are replaced once per frame by
/// `sim::step`; nothing else mutates them.

use log::warn;

use crate::config::GameConfig;
use crate::domain::ai::Mode;
use crate::domain::collision::{circle_hits_box, push_out};
use crate::domain::entity::{Body, Entity, Human, Obstacle, Pursuer};
use crate::domain::geometry::{wrap_angle, Bounds};
use crate::domain::vision::VisionState;

pub const HUMAN_ID: usize = 0;

/// Push-out rounds for a pursuer spawned inside boxes.
const SPAWN_PASSES: usize = 4;

pub struct WorldState {
    pub bounds: Bounds,

    // ── Entities ──
    pub human: Human,
    pub pursuers: Vec<Pursuer>,
    /// `visions[i]` belongs to `pursuers[i]`.
    pub visions: Vec<VisionState>,
    /// Last decision per pursuer, for the HUD.
    pub modes: Vec<Mode>,

    // ── Static ──
    pub obstacles: Vec<Obstacle>,

    // ── Meta ──
    pub tick: u64,
    pub paused: bool,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl WorldState {
    pub fn new(config: &GameConfig) -> Self {
        let mut world = WorldState {
            bounds: config.sim.bounds,
            human: Human::new(HUMAN_ID, Body::new(0.0, 0.0, 0.0, 0.0)),
            pursuers: vec![],
            visions: vec![],
            modes: vec![],
            obstacles: config.obstacles.clone(),
            tick: 0,
            paused: false,
            message: String::new(),
            message_timer: 0,
        };
        world.spawn(config);
        world
    }

    /// Rebuild entities at their configured start. Obstacles are untouched.
    pub fn restart(&mut self, config: &GameConfig) {
        self.spawn(config);
        self.tick = 0;
        self.paused = false;
        self.message.clear();
        self.message_timer = 0;
    }

    fn spawn(&mut self, config: &GameConfig) {
        let h = &config.human;
        let (hx, hy) = self.bounds.clamp(h.x, h.y, h.size);
        self.human = Human::new(HUMAN_ID, Body::new(hx, hy, h.speed, h.size));

        let ai = &config.ai;
        self.pursuers = ai.spawns.iter()
            .enumerate()
            .map(|(i, s)| {
                let (x, y) = self.clear_spawn(s.x, s.y, ai.size);
                let body = Body::new(x, y, ai.speed, ai.size);
                Pursuer::new(HUMAN_ID + 1 + i, body, wrap_angle(s.rotation), ai.rotation_speed)
            })
            .collect();
        self.visions = vec![VisionState::new(ai.cone_angle, ai.vision_distance); self.pursuers.len()];
        self.modes = vec![Mode::Patrol; self.pursuers.len()];
    }

    /// Clamp a pursuer start into bounds and out of any box. Every move of a
    /// pursuer inside a box would be vetoed, so it could never leave.
    fn clear_spawn(&self, x: f32, y: f32, size: f32) -> (f32, f32) {
        let (mut x, mut y) = self.bounds.clamp(x, y, size);
        for _ in 0..SPAWN_PASSES {
            if !self.obstacles.iter().any(|o| circle_hits_box(x, y, size, o)) {
                return (x, y);
            }
            for o in &self.obstacles {
                (x, y) = push_out(x, y, size, o);
            }
            (x, y) = self.bounds.clamp(x, y, size);
        }
        if self.obstacles.iter().any(|o| circle_hits_box(x, y, size, o)) {
            warn!("pursuer spawn at ({x:.0}, {y:.0}) still overlaps a box");
        }
        (x, y)
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Entity list for the renderer: the human first, then every pursuer.
    pub fn entities(&self) -> Vec<Entity<'_>> {
        let mut list = Vec::with_capacity(1 + self.pursuers.len());
        list.push(Entity::Human(&self.human));
        list.extend(self.pursuers.iter().map(Entity::Ai));
        list
    }

    /// Does any pursuer currently see the human?
    pub fn any_sighting(&self) -> bool {
        self.visions.iter().any(|v| v.can_see_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawnConfig;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn reference_scenario_has_one_pursuer() {
        let w = WorldState::new(&GameConfig::default());
        assert_eq!(w.pursuers.len(), 1);
        assert_eq!(w.visions.len(), 1);
        assert_eq!((w.human.body.x, w.human.body.y), (100.0, 300.0));
        assert_eq!(w.entities().len(), 2);
        assert!(!w.any_sighting());
    }

    #[test]
    fn spawns_are_clamped_into_bounds() {
        let mut cfg = GameConfig::default();
        cfg.human.x = -40.0;
        cfg.ai.spawns = vec![SpawnConfig { x: 9000.0, y: 300.0, rotation: 0.0 }];
        let w = WorldState::new(&cfg);
        assert_eq!(w.human.body.x, 15.0);
        assert_eq!(w.pursuers[0].body.x, 785.0);
    }

    #[test]
    fn spawn_rotation_is_wrapped() {
        let mut cfg = GameConfig::default();
        cfg.ai.spawns = vec![SpawnConfig { x: 700.0, y: 300.0, rotation: 4.0 * PI + 0.5 }];
        let w = WorldState::new(&cfg);
        let rot = w.pursuers[0].rotation;
        assert!(rot > -PI && rot <= PI);
        assert_relative_eq!(rot, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn spawn_inside_a_box_is_pushed_out() {
        let mut cfg = GameConfig::default();
        cfg.obstacles = vec![Obstacle::new(400.0, 300.0, 80.0, 80.0, "gray")];
        // Box spans 360..440; 370 is nearest its left side
        cfg.ai.spawns = vec![SpawnConfig { x: 370.0, y: 300.0, rotation: 0.0 }];
        let w = WorldState::new(&cfg);
        let p = &w.pursuers[0].body;
        assert!(!circle_hits_box(p.x, p.y, p.size, &w.obstacles[0]));
        assert_relative_eq!(p.x, 345.0);
        assert_eq!(p.y, 300.0);
    }

    #[test]
    fn pursuer_ids_follow_human() {
        let mut cfg = GameConfig::default();
        cfg.ai.spawns = vec![
            SpawnConfig { x: 100.0, y: 100.0, rotation: 0.0 },
            SpawnConfig { x: 200.0, y: 200.0, rotation: 0.0 },
        ];
        let w = WorldState::new(&cfg);
        let ids: Vec<usize> = w.pursuers.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn restart_resets_entities_and_meta() {
        let cfg = GameConfig::default();
        let mut w = WorldState::new(&cfg);
        w.human.body.x = 500.0;
        w.tick = 99;
        w.paused = true;
        w.set_message("hi", 10);
        w.restart(&cfg);
        assert_eq!(w.human.body.x, 100.0);
        assert_eq!(w.tick, 0);
        assert!(!w.paused);
        assert!(w.message.is_empty());
    }
}
