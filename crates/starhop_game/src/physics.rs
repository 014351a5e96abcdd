//! Arcade-style physics: gravity, AABB bodies, immovable platforms, bounce,
//! world-bounds clamping, and non-colliding overlap triggers.
//!
//! Coordinates are screen-space **y-down**: the origin is the top-left corner
//! of the canvas and gravity is +y. All gameplay truth lives in these AABBs;
//! sprites are drawn from them, never the other way around.
//!
//! The core algorithm is **axis-separable move-and-slide**: resolve X movement
//! first against the static set, then resolve Y using the already-corrected X
//! position. This prevents diagonal tunneling and produces the "slide along
//! walls" behavior players expect from platformers.
//!
//! Relationships are explicit registrations, mirroring how the scene wires the
//! world together:
//!  - a **collider** makes a dynamic body separate against the static set
//!  - an **overlap pair** reports intersection events from `step` without
//!    altering either body's motion

use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    /// Smaller y edge (y grows downward).
    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    /// Larger y edge (y grows downward).
    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Which sides of a body were in contact during the last step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Touching {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// A dynamic physics body. `enabled: false` removes it from simulation,
/// collision, and overlap reporting without forgetting its configuration --
/// that is what item "collection" does.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub aabb: Aabb,
    pub velocity: Vec2,
    /// Per-axis restitution against statics and world bounds. 0 = dead stop.
    pub bounce: Vec2,
    pub collide_world_bounds: bool,
    pub enabled: bool,
    pub touching: Touching,
    solid_vs_statics: bool,
}

impl Body {
    pub fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            velocity: Vec2::ZERO,
            bounce: Vec2::ZERO,
            collide_world_bounds: false,
            enabled: true,
            touching: Touching::default(),
            solid_vs_statics: false,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.touching.down
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

/// Reported by `step` for each registered overlap pair whose AABBs intersect
/// after integration. Purely informational: neither body's motion changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub a: BodyId,
    pub b: BodyId,
}

#[derive(Debug, Clone, Copy)]
struct MoveResult {
    aabb: Aabb,
    blocked_left: bool,
    blocked_right: bool,
    blocked_up: bool,
    blocked_down: bool,
}

pub struct ArcadePhysics {
    pub gravity: Vec2,
    /// World extent; the playable area is [0, bounds.x] x [0, bounds.y].
    pub bounds: Vec2,
    bodies: Vec<Body>,
    statics: Vec<Aabb>,
    overlap_pairs: Vec<(BodyId, BodyId)>,
}

impl ArcadePhysics {
    pub fn new(gravity: Vec2, bounds: Vec2) -> Self {
        Self {
            gravity,
            bounds,
            bodies: Vec::new(),
            statics: Vec::new(),
            overlap_pairs: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn add_static(&mut self, aabb: Aabb) {
        self.statics.push(aabb);
    }

    /// Make a dynamic body separate against the static set. Unregistered
    /// bodies pass straight through platforms.
    pub fn register_collider(&mut self, id: BodyId) {
        self.bodies[id.0].solid_vs_statics = true;
    }

    /// Register a non-colliding overlap trigger between two bodies.
    pub fn register_overlap(&mut self, a: BodyId, b: BodyId) {
        self.overlap_pairs.push((a, b));
    }

    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.0]
    }

    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.0]
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn statics_iter(&self) -> impl Iterator<Item = &Aabb> {
        self.statics.iter()
    }

    /// Advance every enabled body by `dt` seconds, then report overlap events
    /// for registered pairs. Deterministic: same state + same dt = same result.
    pub fn step(&mut self, dt: f32) -> Vec<OverlapEvent> {
        for body in &mut self.bodies {
            if !body.enabled {
                continue;
            }

            body.velocity += self.gravity * dt;
            let dx = body.velocity.x * dt;
            let dy = body.velocity.y * dt;

            let mut result = if body.solid_vs_statics {
                move_and_collide(&self.statics, body.aabb, dx, dy)
            } else {
                let mut moved = body.aabb;
                moved.center_x += dx;
                moved.center_y += dy;
                MoveResult {
                    aabb: moved,
                    blocked_left: false,
                    blocked_right: false,
                    blocked_up: false,
                    blocked_down: false,
                }
            };

            if body.collide_world_bounds {
                clamp_to_bounds(&mut result, self.bounds);
            }

            body.aabb = result.aabb;
            body.touching = Touching {
                left: result.blocked_left,
                right: result.blocked_right,
                up: result.blocked_up,
                down: result.blocked_down,
            };

            // Restitution: reflect velocity through the bounce coefficient on
            // axes where motion was actually blocked in the direction of travel.
            if (result.blocked_right && body.velocity.x > 0.0)
                || (result.blocked_left && body.velocity.x < 0.0)
            {
                body.velocity.x = -body.velocity.x * body.bounce.x;
            }
            if (result.blocked_down && body.velocity.y > 0.0)
                || (result.blocked_up && body.velocity.y < 0.0)
            {
                body.velocity.y = -body.velocity.y * body.bounce.y;
            }
        }

        let mut events = Vec::new();
        for &(a, b) in &self.overlap_pairs {
            let body_a = &self.bodies[a.0];
            let body_b = &self.bodies[b.0];
            if body_a.enabled && body_b.enabled && body_a.aabb.intersects(&body_b.aabb) {
                events.push(OverlapEvent { a, b });
            }
        }
        events
    }
}

fn move_and_collide(statics: &[Aabb], aabb: Aabb, dx: f32, dy: f32) -> MoveResult {
    const EPS: f32 = 0.0001;

    // Axis-separable move-and-slide:
    // resolve X first, then resolve Y using the updated X position.
    let resolved_x = resolve_axis_x(statics, aabb, dx);
    let x_expected = aabb.center_x + dx;
    let collided_x = (resolved_x - x_expected).abs() > EPS;

    let mut moved = aabb;
    moved.center_x = resolved_x;
    let resolved_y = resolve_axis_y(statics, moved, dy);
    let y_expected = aabb.center_y + dy;
    let collided_y = (resolved_y - y_expected).abs() > EPS;
    moved.center_y = resolved_y;

    MoveResult {
        aabb: moved,
        blocked_left: collided_x && dx < 0.0,
        blocked_right: collided_x && dx > 0.0,
        blocked_up: collided_y && dy < 0.0,
        blocked_down: collided_y && dy > 0.0,
    }
}

fn resolve_axis_x(statics: &[Aabb], aabb: Aabb, dx: f32) -> f32 {
    if dx == 0.0 {
        return aabb.center_x;
    }

    const EPS: f32 = 0.001;
    let mut candidate_x = aabb.center_x + dx;
    let min_y = aabb.top() + EPS;
    let max_y = aabb.bottom() - EPS;

    for solid in statics {
        if solid.bottom() <= min_y || solid.top() >= max_y {
            continue;
        }
        if dx > 0.0 {
            // Only clamp when the leading edge actually crosses the face this
            // step; a body already embedded is left alone.
            if aabb.right() <= solid.left() + EPS && candidate_x + aabb.half_w > solid.left() {
                candidate_x = candidate_x.min(solid.left() - aabb.half_w);
            }
        } else if aabb.left() >= solid.right() - EPS && candidate_x - aabb.half_w < solid.right() {
            candidate_x = candidate_x.max(solid.right() + aabb.half_w);
        }
    }

    // Guardrail: never push opposite direction during resolution.
    if dx > 0.0 {
        candidate_x.max(aabb.center_x)
    } else {
        candidate_x.min(aabb.center_x)
    }
}

fn resolve_axis_y(statics: &[Aabb], aabb: Aabb, dy: f32) -> f32 {
    if dy == 0.0 {
        return aabb.center_y;
    }

    const EPS: f32 = 0.001;
    let mut candidate_y = aabb.center_y + dy;
    let min_x = aabb.left() + EPS;
    let max_x = aabb.right() - EPS;

    for solid in statics {
        if solid.right() <= min_x || solid.left() >= max_x {
            continue;
        }
        if dy > 0.0 {
            // Moving down: clamp onto the solid's top face.
            if aabb.bottom() <= solid.top() + EPS && candidate_y + aabb.half_h > solid.top() {
                candidate_y = candidate_y.min(solid.top() - aabb.half_h);
            }
        } else if aabb.top() >= solid.bottom() - EPS && candidate_y - aabb.half_h < solid.bottom() {
            candidate_y = candidate_y.max(solid.bottom() + aabb.half_h);
        }
    }

    // Guardrail: never push opposite direction during resolution.
    if dy > 0.0 {
        candidate_y.max(aabb.center_y)
    } else {
        candidate_y.min(aabb.center_y)
    }
}

fn clamp_to_bounds(result: &mut MoveResult, bounds: Vec2) {
    let aabb = &mut result.aabb;
    if aabb.left() < 0.0 {
        aabb.center_x = aabb.half_w;
        result.blocked_left = true;
    } else if aabb.right() > bounds.x {
        aabb.center_x = bounds.x - aabb.half_w;
        result.blocked_right = true;
    }
    if aabb.top() < 0.0 {
        aabb.center_y = aabb.half_h;
        result.blocked_up = true;
    } else if aabb.bottom() > bounds.y {
        aabb.center_y = bounds.y - aabb.half_h;
        result.blocked_down = true;
    }
}
