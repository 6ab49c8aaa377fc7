/// Collision resolver: "no move into solid".
///
/// The mover is a circle of radius `size`. Obstacles are axis-aligned boxes,
/// other entities are circles. Any overlap at the proposed position vetoes
/// the move and the mover stays where it was. There is no slide or push-out.
///
/// Touching (distance == radius) does not count as overlap, so a mover
/// resting against a wall can still move away from it.

use super::entity::{Body, Obstacle};

/// Does a circle at (cx, cy) with radius `r` overlap the box?
pub fn circle_hits_box(cx: f32, cy: f32, r: f32, obstacle: &Obstacle) -> bool {
    let (l, t, rt, b) = obstacle.rect();
    let nx = cx.clamp(l, rt);
    let ny = cy.clamp(t, b);
    let dx = cx - nx;
    let dy = cy - ny;
    dx * dx + dy * dy < r * r
}

pub fn circle_hits_circle(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = bx - ax;
    let dy = by - ay;
    let reach = ar + br;
    dx * dx + dy * dy < reach * reach
}

/// Resolve a proposed move. Returns the proposed position verbatim when it is
/// clear, the mover's current (pre-move) position otherwise.
pub fn resolve(
    proposed_x: f32,
    proposed_y: f32,
    mover: &Body,
    obstacles: &[Obstacle],
    others: &[Body],
) -> (f32, f32) {
    let r = mover.size;

    let blocked = obstacles.iter().any(|o| circle_hits_box(proposed_x, proposed_y, r, o))
        || others.iter().any(|b| circle_hits_circle(proposed_x, proposed_y, r, b.x, b.y, b.size));

    if blocked {
        (mover.x, mover.y)
    } else {
        (proposed_x, proposed_y)
    }
}

/// Smallest shift that leaves a circle touching, not overlapping, the box.
/// A circle already clear of the box comes back unchanged.
pub fn push_out(cx: f32, cy: f32, r: f32, obstacle: &Obstacle) -> (f32, f32) {
    if !circle_hits_box(cx, cy, r, obstacle) {
        return (cx, cy);
    }
    let (l, t, rt, b) = obstacle.rect();
    let nx = cx.clamp(l, rt);
    let ny = cy.clamp(t, b);
    let (dx, dy) = (cx - nx, cy - ny);
    let d = dx.hypot(dy);
    if d > 0.0 {
        // Center outside the box: slide away from the nearest point
        return (nx + dx / d * r, ny + dy / d * r);
    }

    // Center inside: leave through the closest side
    let exits = [
        (cx - l, (l - r, cy)),
        (rt - cx, (rt + r, cy)),
        (cy - t, (cx, t - r)),
        (b - cy, (cx, b + r)),
    ];
    exits.iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|e| e.1)
        .unwrap_or((cx, cy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mover_at(x: f32, y: f32) -> Body {
        Body::new(x, y, 2.0, 10.0)
    }

    fn wall() -> Obstacle {
        Obstacle::new(100.0, 100.0, 40.0, 40.0, "gray")
    }

    #[test]
    fn overlap_returns_original_position() {
        let m = mover_at(60.0, 100.0);
        assert_eq!(resolve(75.0, 100.0, &m, &[wall()], &[]), (60.0, 100.0));
    }

    #[test]
    fn clear_move_returns_proposed_verbatim() {
        let m = mover_at(40.0, 100.0);
        assert_eq!(resolve(42.5, 100.25, &m, &[wall()], &[]), (42.5, 100.25));
    }

    #[test]
    fn touching_edge_is_not_overlap() {
        // Box left edge at 80, radius 10 → center at 70 just touches
        let m = mover_at(65.0, 100.0);
        assert_eq!(resolve(70.0, 100.0, &m, &[wall()], &[]), (70.0, 100.0));
    }

    #[test]
    fn corner_uses_circle_distance() {
        // Near the top-left corner (80, 80) but diagonally outside radius
        let m = mover_at(60.0, 60.0);
        assert_eq!(resolve(72.0, 72.0, &m, &[wall()], &[]), (72.0, 72.0));
        assert_eq!(resolve(75.0, 75.0, &m, &[wall()], &[]), (60.0, 60.0));
    }

    #[test]
    fn other_bodies_block() {
        let m = mover_at(0.0, 0.0);
        let other = Body::new(25.0, 0.0, 0.0, 10.0);
        assert_eq!(resolve(10.0, 0.0, &m, &[], &[other]), (0.0, 0.0));
        assert_eq!(resolve(4.0, 0.0, &m, &[], &[other]), (4.0, 0.0));
    }

    #[test]
    fn obstacle_order_does_not_matter() {
        let far = Obstacle::new(500.0, 500.0, 10.0, 10.0, "gray");
        let m = mover_at(60.0, 100.0);
        let a = resolve(75.0, 100.0, &m, &[wall(), far.clone()], &[]);
        let b = resolve(75.0, 100.0, &m, &[far, wall()], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn push_out_from_inside_takes_nearest_side() {
        // Box spans 80..120; center 85 is nearest the left edge
        let (x, y) = push_out(85.0, 100.0, 10.0, &wall());
        assert_eq!((x, y), (70.0, 100.0));
        assert!(!circle_hits_box(x, y, 10.0, &wall()));
    }

    #[test]
    fn push_out_from_outside_reaches_touching() {
        let (x, y) = push_out(100.0, 125.0, 10.0, &wall());
        assert_eq!((x, y), (100.0, 130.0));
        assert_eq!(push_out(40.0, 40.0, 10.0, &wall()), (40.0, 40.0));
    }

    #[test]
    fn zero_area_obstacle_is_a_point() {
        let point = Obstacle::new(50.0, 50.0, 0.0, 0.0, "gray");
        let m = mover_at(30.0, 50.0);
        assert_eq!(resolve(45.0, 50.0, &m, &[point.clone()], &[]), (30.0, 50.0));
        assert_eq!(resolve(35.0, 50.0, &m, &[point], &[]), (35.0, 50.0));
    }
}
