/// Vision cone: what a pursuer can see this frame.
///
/// The check is a two-stage filter:
///   1. Distance pre-filter (cheap): anything beyond `max_distance` is unseen.
///   2. Angular test: the bearing to the target must lie within half the
///      cone width of the observer's facing.
///
/// Both boundaries are inclusive: a target exactly at `max_distance`, or
/// exactly on the cone edge, is seen.

use super::geometry::{bearing, distance};

/// Per-pursuer perception, recomputed every frame. Never persisted.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct VisionState {
    pub can_see_player: bool,
    /// Total cone width in degrees.
    pub cone_angle: f32,
    pub vision_distance: f32,
}

impl VisionState {
    pub fn new(cone_angle: f32, vision_distance: f32) -> Self {
        VisionState { can_see_player: false, cone_angle, vision_distance }
    }

    /// Same cone, new sighting result.
    pub fn with_sight(self, can_see_player: bool) -> Self {
        VisionState { can_see_player, ..self }
    }
}

/// Is `target` inside the observer's vision cone?
///
/// `facing` is `None` for an idle observer, which never sees anything.
pub fn is_within_cone(
    observer: (f32, f32),
    facing: Option<f32>,
    target: (f32, f32),
    cone_angle_deg: f32,
    max_distance: f32,
) -> bool {
    let facing = match facing {
        Some(f) => f,
        None => return false,
    };

    let dist = distance(observer.0, observer.1, target.0, target.1);
    if dist > max_distance {
        return false;
    }

    let to_target = bearing(observer.0, observer.1, target.0, target.1).to_degrees();
    let mut diff = (to_target - facing.to_degrees()).abs() % 360.0;
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff <= cone_angle_deg / 2.0
}
