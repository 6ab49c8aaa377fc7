/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages, sound and logs.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SimEvent {
    /// Pursuer `id` gained sight of the human this frame.
    TargetSpotted { id: usize },
    /// Pursuer `id` lost sight of the human this frame.
    TargetLost { id: usize },
    /// Pursuer `id` entered contact range and is holding.
    Contact { id: usize },
    WallBounce { id: usize },
    Deflected { id: usize },
}
