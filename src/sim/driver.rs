/// Frame driver: owns the world, the RNG and the clock across frames.
///
/// One frame = input snapshot → `step` → draw. A frame with no drawable
/// surface is dropped whole (no step, no draw) so the simulation never runs
/// ahead of what the player can see.

use std::io;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::config::GameConfig;
use crate::domain::keys::KeyState;
use super::clock::FrameClock;
use super::event::SimEvent;
use super::step;
use super::world::WorldState;

/// Where finished frames go. Pure consumer of state; no feedback into the core.
pub trait RenderSink {
    /// Is there a surface to draw on right now?
    fn is_ready(&mut self) -> bool;
    fn draw(&mut self, world: &WorldState) -> io::Result<()>;
}

#[derive(Debug, PartialEq)]
pub enum Frame {
    /// No surface: nothing stepped, nothing drawn.
    Dropped,
    Ran(Vec<SimEvent>),
}

pub struct FrameDriver<R: Rng> {
    pub world: WorldState,
    rng: R,
    clock: FrameClock,
    dropped: u64,
}

impl<R: Rng> FrameDriver<R> {
    pub fn new(world: WorldState, rng: R, tick_rate: Duration) -> Self {
        FrameDriver {
            world,
            rng,
            clock: FrameClock::new(tick_rate),
            dropped: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn stop(&mut self) {
        debug!("frame driver stopping after {} ticks", self.world.tick);
        self.clock.stop();
    }

    pub fn due(&self) -> bool {
        self.clock.due()
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Run exactly one frame now.
    pub fn run_frame(&mut self, keys: &KeyState, sink: &mut dyn RenderSink) -> io::Result<Frame> {
        self.clock.mark();

        if !sink.is_ready() {
            self.dropped += 1;
            debug!("no render surface, frame dropped ({} so far)", self.dropped);
            return Ok(Frame::Dropped);
        }

        let events = step::step(&mut self.world, keys, &mut self.rng);
        for e in &events {
            debug!("tick {}: {:?}", self.world.tick, e);
        }

        sink.draw(&self.world)?;
        Ok(Frame::Ran(events))
    }

    pub fn toggle_pause(&mut self) {
        self.world.paused = !self.world.paused;
        if self.world.paused {
            self.world.set_message("PAUSED  [p] Resume", 0);
        } else {
            self.world.message.clear();
            self.world.message_timer = 0;
        }
    }

    /// Rebuild entities from config. The RNG keeps its stream.
    pub fn restart(&mut self, config: &GameConfig) {
        debug!("restart at tick {}", self.world.tick);
        self.world.restart(config);
        self.world.set_message("Restarted", 60);
    }

    pub fn tick_rate(&self) -> Duration {
        self.clock.tick_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct MockSink {
        ready: bool,
        draws: usize,
        last_tick: u64,
    }

    impl RenderSink for MockSink {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn draw(&mut self, world: &WorldState) -> io::Result<()> {
            self.draws += 1;
            self.last_tick = world.tick;
            Ok(())
        }
    }

    fn driver() -> FrameDriver<ChaCha8Rng> {
        let cfg = GameConfig::default();
        FrameDriver::new(
            WorldState::new(&cfg),
            ChaCha8Rng::seed_from_u64(3),
            Duration::from_millis(16),
        )
    }

    #[test]
    fn frame_steps_then_draws() {
        let mut d = driver();
        let mut sink = MockSink { ready: true, ..Default::default() };
        let frame = d.run_frame(&KeyState::new(), &mut sink).unwrap();
        assert!(matches!(frame, Frame::Ran(_)));
        assert_eq!(sink.draws, 1);
        assert_eq!(sink.last_tick, 1);
    }

    #[test]
    fn missing_surface_drops_the_frame() {
        let mut d = driver();
        let mut sink = MockSink::default();
        let keys: KeyState = ["d"].into_iter().collect();
        let frame = d.run_frame(&keys, &mut sink).unwrap();
        assert_eq!(frame, Frame::Dropped);
        assert_eq!(sink.draws, 0);
        assert_eq!(d.world.tick, 0);
        assert_eq!(d.world.human.body.x, 100.0);
        assert_eq!(d.dropped_frames(), 1);
    }

    #[test]
    fn stop_halts_scheduling() {
        let mut d = driver();
        assert!(d.is_running());
        d.stop();
        assert!(!d.is_running());
        assert!(!d.due());
    }

    #[test]
    fn pause_toggles_and_blocks_stepping() {
        let mut d = driver();
        let mut sink = MockSink { ready: true, ..Default::default() };
        d.toggle_pause();
        assert!(d.world.paused);
        d.run_frame(&KeyState::new(), &mut sink).unwrap();
        assert_eq!(d.world.tick, 0);
        // Still drawn so the pause overlay shows
        assert_eq!(sink.draws, 1);
        d.toggle_pause();
        assert!(!d.world.paused);
        assert!(d.world.message.is_empty());
    }

    #[test]
    fn same_seed_same_run() {
        let mut a = driver();
        let mut b = driver();
        let mut sink = MockSink { ready: true, ..Default::default() };
        let keys: KeyState = ["s", "d"].into_iter().collect();
        for _ in 0..300 {
            a.run_frame(&keys, &mut sink).unwrap();
            b.run_frame(&keys, &mut sink).unwrap();
        }
        assert_eq!(a.world.pursuers, b.world.pursuers);
        assert_eq!(a.world.human, b.world.human);
    }
}
