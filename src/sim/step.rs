/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Human controller (reads the key snapshot)
///   2. Each pursuer, in order, against the NEW human and its OLD vision,
///      blocked by boxes and by the other pursuers
///   3. Events derived from what changed
///   4. Message timer
///
/// Randomness is injected so seeded runs replay exactly.

use rand::Rng;

use crate::domain::ai::{self, Mode};
use crate::domain::entity::Body;
use crate::domain::human;
use crate::domain::keys::KeyState;
use super::event::SimEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng>(world: &mut WorldState, keys: &KeyState, rng: &mut R) -> Vec<SimEvent> {
    if world.paused { return vec![]; }

    let mut events: Vec<SimEvent> = Vec::new();
    world.tick += 1;

    world.human = human::step(&world.human, keys, world.bounds);
    resolve_pursuers(world, rng, &mut events);

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Pursuers
// ══════════════════════════════════════════════════════════════

fn resolve_pursuers<R: Rng>(world: &mut WorldState, rng: &mut R, events: &mut Vec<SimEvent>) {
    for i in 0..world.pursuers.len() {
        // Earlier pursuers already moved this frame; later ones haven't yet
        let peers: Vec<Body> = world.pursuers.iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| p.body)
            .collect();
        let out = ai::step_detailed(
            &world.pursuers[i],
            &world.human,
            &world.visions[i],
            world.bounds,
            &world.obstacles,
            &peers,
            rng,
        );
        let id = out.pursuer.id;

        let saw = world.visions[i].can_see_player;
        if out.vision.can_see_player && !saw {
            events.push(SimEvent::TargetSpotted { id });
        } else if !out.vision.can_see_player && saw {
            events.push(SimEvent::TargetLost { id });
        }
        if out.mode == Mode::Hold && world.modes[i] != Mode::Hold {
            events.push(SimEvent::Contact { id });
        }
        if out.bounced { events.push(SimEvent::WallBounce { id }); }
        if out.deflected { events.push(SimEvent::Deflected { id }); }

        world.pursuers[i] = out.pursuer;
        world.visions[i] = out.vision;
        world.modes[i] = out.mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, SpawnConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Open field, one pursuer facing the human from the right.
    fn open_world(ax: f32) -> WorldState {
        let mut cfg = GameConfig::default();
        cfg.obstacles.clear();
        cfg.ai.spawns = vec![SpawnConfig { x: ax, y: 300.0, rotation: std::f32::consts::PI }];
        WorldState::new(&cfg)
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1)
    }

    #[test]
    fn human_moves_before_pursuers_look() {
        let mut w = open_world(700.0);
        // Human starts at x=100, 600 away: out of sight
        let keys: KeyState = ["d"].into_iter().collect();
        let events = step(&mut w, &keys, &mut rng());
        assert_eq!(w.human.body.x, 103.0);
        assert!(events.is_empty());
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn spotted_on_first_sight() {
        let mut w = open_world(250.0);
        let events = step(&mut w, &KeyState::new(), &mut rng());
        assert_eq!(events, vec![SimEvent::TargetSpotted { id: 1 }]);
        assert!(w.any_sighting());
        assert_eq!(w.modes[0], Mode::Track);
    }

    #[test]
    fn contact_is_reported_once() {
        let mut w = open_world(120.0);
        let mut r = rng();
        let first = step(&mut w, &KeyState::new(), &mut r);
        assert!(first.contains(&SimEvent::Contact { id: 1 }));
        assert_eq!(w.modes[0], Mode::Hold);
        assert_eq!(w.pursuers[0].body.x, 120.0);

        let second = step(&mut w, &KeyState::new(), &mut r);
        assert!(second.is_empty());
    }

    #[test]
    fn lost_when_human_escapes_behind() {
        let mut w = open_world(250.0);
        let mut r = rng();
        step(&mut w, &KeyState::new(), &mut r);
        assert!(w.visions[0].can_see_player);
        // Teleport the human behind the pursuer
        w.human.body.x = 500.0;
        let events = step(&mut w, &KeyState::new(), &mut r);
        assert!(events.contains(&SimEvent::TargetLost { id: 1 }));
    }

    #[test]
    fn paused_world_does_not_advance() {
        let mut w = open_world(700.0);
        w.paused = true;
        let keys: KeyState = ["d"].into_iter().collect();
        assert!(step(&mut w, &keys, &mut rng()).is_empty());
        assert_eq!(w.human.body.x, 100.0);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn message_expires() {
        let mut w = open_world(700.0);
        w.set_message("hello", 2);
        step(&mut w, &KeyState::new(), &mut rng());
        assert_eq!(w.message, "hello");
        step(&mut w, &KeyState::new(), &mut rng());
        assert!(w.message.is_empty());
    }

    #[test]
    fn pursuers_do_not_pass_through_each_other() {
        let mut cfg = GameConfig::default();
        cfg.obstacles.clear();
        cfg.human.x = 100.0;
        cfg.human.y = 550.0;
        // Head-on, 40 apart, both patrolling toward each other
        cfg.ai.spawns = vec![
            SpawnConfig { x: 380.0, y: 100.0, rotation: 0.0 },
            SpawnConfig { x: 420.0, y: 100.0, rotation: std::f32::consts::PI },
        ];
        let mut w = WorldState::new(&cfg);
        let mut r = rng();
        let mut deflected = false;
        for _ in 0..10 {
            let events = step(&mut w, &KeyState::new(), &mut r);
            deflected |= events.iter().any(|e| matches!(e, SimEvent::Deflected { .. }));
            let (a, b) = (&w.pursuers[0].body, &w.pursuers[1].body);
            let gap = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            assert!(gap >= a.size + b.size - 1e-3, "gap {gap}");
        }
        assert!(deflected);
    }

    #[test]
    fn tracking_pursuer_reaches_contact() {
        let mut w = open_world(240.0);
        let mut r = rng();
        let mut contact = false;
        for _ in 0..200 {
            let events = step(&mut w, &KeyState::new(), &mut r);
            if events.contains(&SimEvent::Contact { id: 1 }) {
                contact = true;
                break;
            }
        }
        assert!(contact);
        assert_eq!(w.modes[0], Mode::Hold);
    }

    #[test]
    fn many_pursuers_share_the_contract() {
        let mut cfg = GameConfig::default();
        cfg.ai.spawns = (0..4)
            .map(|i| SpawnConfig { x: 150.0 + 150.0 * i as f32, y: 100.0, rotation: 0.5 })
            .collect();
        let mut w = WorldState::new(&cfg);
        let mut r = rng();
        for _ in 0..500 {
            step(&mut w, &KeyState::new(), &mut r);
        }
        for p in &w.pursuers {
            let s = p.body.size;
            assert!(p.body.x >= s && p.body.x <= 800.0 - s);
            assert!(p.body.y >= s && p.body.y <= 600.0 - s);
        }
    }
}
