/// Entities: the human avatar, pursuers, and static obstacles.
///
/// Each entity kind carries only the fields its behavior needs. Shared
/// kinematics live in `Body`.

use std::f32::consts::PI;

/// Human facing label. `None` is only the initial (idle) state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Facing angle in radians; `None` when idle.
    pub fn angle(self) -> Option<f32> {
        match self {
            Direction::Up => Some(-PI / 2.0),
            Direction::Down => Some(PI / 2.0),
            Direction::Left => Some(PI),
            Direction::Right => Some(0.0),
            Direction::None => None,
        }
    }
}

/// Position and kinematics shared by every moving entity.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    /// Units per frame.
    pub speed: f32,
    /// Collision radius.
    pub size: f32,
    /// Visual breathing phase in [0, 2π). Not behaviorally load-bearing.
    pub pulse: f32,
}

impl Body {
    pub fn new(x: f32, y: f32, speed: f32, size: f32) -> Self {
        Body { x, y, speed, size, pulse: 0.0 }
    }

    pub fn pos(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Human {
    pub id: usize,
    pub body: Body,
    pub direction: Direction,
}

impl Human {
    pub fn new(id: usize, body: Body) -> Self {
        Human { id, body, direction: Direction::None }
    }
}

/// Autonomous pursuer (continuous-rotation model).
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pursuer {
    pub id: usize,
    pub body: Body,
    /// Facing in radians, kept in (-π, π].
    pub rotation: f32,
    /// Max radians turned per frame while tracking.
    pub rotation_speed: f32,
}

impl Pursuer {
    pub fn new(id: usize, body: Body, rotation: f32, rotation_speed: f32) -> Self {
        Pursuer { id, body, rotation, rotation_speed }
    }
}

/// Entity list element handed to the renderer.
#[derive(Clone, Copy, Debug)]
pub enum Entity<'a> {
    Human(&'a Human),
    Ai(&'a Pursuer),
}

impl<'a> Entity<'a> {
    pub fn body(&self) -> &'a Body {
        match self {
            Entity::Human(h) => &h.body,
            Entity::Ai(p) => &p.body,
        }
    }

    /// Facing in radians, `None` while idle.
    pub fn facing(&self) -> Option<f32> {
        match self {
            Entity::Human(h) => h.direction.angle(),
            Entity::Ai(p) => Some(p.rotation),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entity::Human(_) => "YOU",
            Entity::Ai(_) => "AI",
        }
    }
}

/// Static axis-aligned box, centered at (x, y). Immutable during a run.
#[derive(Clone, PartialEq, Debug)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Color name or `#rrggbb`; interpreted by the renderer.
    pub color: String,
    pub pulse: Option<f32>,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: &str) -> Self {
        Obstacle {
            x, y,
            width: width.max(0.0),
            height: height.max(0.0),
            color: color.to_string(),
            pulse: None,
        }
    }

    /// Extent as (left, top, right, bottom).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        (self.x - hw, self.y - hh, self.x + hw, self.y + hh)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (l, t, r, b) = self.rect();
        x >= l && x <= r && y >= t && y <= b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_direction_has_no_angle() {
        assert_eq!(Direction::None.angle(), None);
        assert_eq!(Direction::default(), Direction::None);
        assert_eq!(Direction::Right.angle(), Some(0.0));
    }

    #[test]
    fn obstacle_rect_is_centered() {
        let o = Obstacle::new(100.0, 50.0, 40.0, 20.0, "red");
        assert_eq!(o.rect(), (80.0, 40.0, 120.0, 60.0));
        assert!(o.contains(100.0, 50.0));
        assert!(!o.contains(79.0, 50.0));
    }

    #[test]
    fn negative_extent_becomes_zero_area() {
        let o = Obstacle::new(10.0, 10.0, -5.0, 4.0, "gray");
        assert_eq!(o.width, 0.0);
        assert_eq!(o.rect(), (10.0, 8.0, 10.0, 12.0));
    }

    #[test]
    fn entity_view_dispatches_by_kind() {
        let h = Human::new(0, Body::new(1.0, 2.0, 3.0, 4.0));
        let p = Pursuer::new(1, Body::new(5.0, 6.0, 2.0, 4.0), 1.0, 0.05);
        assert_eq!(Entity::Human(&h).facing(), None);
        assert_eq!(Entity::Ai(&p).facing(), Some(1.0));
        assert_eq!(Entity::Ai(&p).body().x, 5.0);
        assert_eq!(Entity::Human(&h).label(), "YOU");
    }
}
