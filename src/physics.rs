// Per-frame raindrop motion against the obstacle mask.
// Visual outcomes:
// - Free drops accelerate downward and stretch a little while slow.
// - A drop that lands on a dark region stops, is pushed up to rest on top of it,
//   picks up a colour, and slides/tilts along the obstacle's edge.
//
// Passes run in a fixed order over the whole store:
//   integrate -> detect -> rise -> deflect
// The mask is only read here; the pipeline has already written it this frame.
//
// Gravity, damping and the small velocity nudges are per-frame constants; only
// position deltas taken from velocities are multiplied by `dt`.

use crate::coords::{in_view, scene_to_cell, scene_y_to_row};
use crate::rain::{PALETTE, RECYCLE_Y, RaindropStore, SPAWN_Y};
use crate::types::PixelBuffer;
use rand::Rng;

pub const GRAVITY_STEP: f32 = 0.01;
pub const TERMINAL_VY: f32 = -1.0;
const STILL_VY: f32 = -0.001;
const STRETCH_BASE: f32 = 0.9;

/// Upward nudge speed while blocked (scene units / second).
pub const RISE_SPEED: f32 = 0.01;
/// Added to vy on every escape step.
const ESCAPE_VY_STEP: f32 = 0.0003;
/// Upper bound on escape steps per drop per frame.
pub const MAX_ESCAPE_STEPS: usize = 200_000;

/// Impact response: vy -> -vy/4 and (small) vx -> -vx/100.
const BOUNCE_DIVISOR: f32 = 4.0;
const DRIFT_DIVISOR: f32 = 100.0;
const DRIFT_EPSILON: f32 = 0.001;

/// Columns checked on each side, one row under the drop.
pub const SIDE_CHECK_WIDTH: i64 = 10;
const SLIDE_SPEED: f32 = 0.07;
const TILT_STEP: f32 = 0.1;
const SLIDE_VX_STEP: f32 = 0.0001;

/// What happened in one `step`, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub recycled: usize,
    pub blocked: usize,
}

/// Run all passes for one frame.
pub fn step<R: Rng + ?Sized>(store: &mut RaindropStore, mask: &PixelBuffer, dt: f32, rng: &mut R) -> StepStats {
    let recycled = integrate(store, dt, rng);
    let blocked = detect(store, mask);
    rise(store, mask, dt);
    deflect(store, mask, dt, rng);
    StepStats { recycled, blocked }
}

/// Gravity + motion for unblocked drops; recycles the ones that fell off.
pub fn integrate<R: Rng + ?Sized>(store: &mut RaindropStore, dt: f32, rng: &mut R) -> usize {
    let mut recycled = 0;
    for d in store.iter_mut().filter(|d| !d.blocked) {
        if d.vy > TERMINAL_VY {
            d.vy = (d.vy - GRAVITY_STEP).max(TERMINAL_VY);
        }
        d.scale = if d.vy > STILL_VY { (1.0, -d.vy + STRETCH_BASE) } else { (1.0, 1.0) };

        d.x += d.vx;
        // an escape can leave vy well above zero; y never passes the spawn line
        d.y = (d.y + d.vy * dt).min(SPAWN_Y);

        if d.y < RECYCLE_Y {
            d.recycle(rng);
            recycled += 1;
        }
    }
    recycled
}

/// Map every drop onto the mask and update `blocked`. Returns how many are blocked.
pub fn detect(store: &mut RaindropStore, mask: &PixelBuffer) -> usize {
    let (w, h) = mask.dimensions();
    let mut blocked = 0;
    for d in store.iter_mut() {
        d.cell = scene_to_cell(d.x, d.y, w, h);

        if !in_view(d.x, d.y) {
            d.blocked = false;
            continue;
        }

        if mask.is_obstacle(d.cell.0, d.cell.1) {
            if d.vy < STILL_VY {
                d.vy = -d.vy / BOUNCE_DIVISOR;
            }
            if d.vx.abs() > DRIFT_EPSILON {
                d.vx = -d.vx / DRIFT_DIVISOR;
            }
            d.blocked = true;
            blocked += 1;
        } else {
            d.blocked = false;
        }
    }
    blocked
}

/// Push blocked drops upward until they sit on a free cell (or hit the top).
pub fn rise(store: &mut RaindropStore, mask: &PixelBuffer, dt: f32) {
    let h = mask.height();
    let lift = RISE_SPEED * dt;
    for d in store.iter_mut().filter(|d| d.blocked) {
        d.y = (d.y + lift).min(SPAWN_Y);
        if lift <= 0.0 {
            continue;
        }

        let col = d.cell.0;
        let mut row = d.cell.1;
        let mut steps = 0;
        while mask.is_obstacle(col, row) && steps < MAX_ESCAPE_STEPS {
            d.y += lift;
            d.vy += ESCAPE_VY_STEP;
            if d.y >= SPAWN_Y {
                d.y = SPAWN_Y;
                break;
            }
            row = scene_y_to_row(d.y, h);
            steps += 1;
        }
    }
}

/// Colour on first contact, then slide away from nearby obstacle pixels below.
pub fn deflect<R: Rng + ?Sized>(store: &mut RaindropStore, mask: &PixelBuffer, dt: f32, rng: &mut R) {
    let slide = SLIDE_SPEED * dt;
    for d in store.iter_mut().filter(|d| d.blocked) {
        if !d.color_assigned {
            d.color = PALETTE[rng.random_range(0..PALETTE.len())];
            d.color_assigned = true;
        }

        let (col, row) = d.cell;
        let below = row + 1;
        for j in 0..SIDE_CHECK_WIDTH {
            // obstacle on the left: move right, tilt clockwise
            if mask.is_obstacle(col - j, below) {
                d.x += slide;
                d.rotation -= TILT_STEP;
                d.vx += SLIDE_VX_STEP;
            }
            // obstacle on the right: move left, tilt counter-clockwise
            if mask.is_obstacle(col + j, below) {
                d.x -= slide;
                d.rotation += TILT_STEP;
                d.vx -= SLIDE_VX_STEP;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::row_to_scene_y;
    use crate::rain::{DropId, PLACEHOLDER_COLOR, Raindrop};
    use rand::{SeedableRng, rngs::StdRng};

    const DT: f32 = 1.0 / 60.0;
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn one_drop(x: f32, y: f32) -> RaindropStore {
        let mut s = RaindropStore::new();
        let mut d = Raindrop::new(x, 'a');
        d.y = y;
        s.push(d);
        s
    }

    fn first(s: &RaindropStore) -> &Raindrop {
        s.iter().next().unwrap()
    }

    #[test]
    fn gravity_accumulates_to_terminal_speed() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut s = one_drop(0.0, 1.0);
        integrate(&mut s, DT, &mut rng);
        assert!((first(&s).vy + GRAVITY_STEP).abs() < 1e-6);
        for _ in 0..500 {
            let before = first(&s).vy;
            integrate(&mut s, 0.0, &mut rng); // dt 0: no motion, gravity only
            let after = first(&s).vy;
            assert!(after <= before);
            assert!(after >= TERMINAL_VY);
        }
        assert_eq!(first(&s).vy, TERMINAL_VY);
    }

    #[test]
    fn upward_speed_never_carries_past_spawn_height() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut s = one_drop(0.0, 1.0);
        s.get_mut(DropId(0)).unwrap().vy = 3.5;
        for _ in 0..400 {
            integrate(&mut s, DT, &mut rng);
            assert!(first(&s).y <= SPAWN_Y);
        }
        // gravity eventually wins and it falls again
        assert!(first(&s).vy < 0.0);
        assert!(first(&s).y < SPAWN_Y);
    }

    #[test]
    fn stretch_follows_vertical_speed() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut s = one_drop(0.0, 1.0);
        s.get_mut(DropId(0)).unwrap().vy = 0.2;
        integrate(&mut s, DT, &mut rng);
        let d = first(&s);
        assert!((d.scale.1 - (-d.vy + 0.9)).abs() < 1e-6);

        s.get_mut(DropId(0)).unwrap().vy = -0.5;
        integrate(&mut s, DT, &mut rng);
        assert_eq!(first(&s).scale, (1.0, 1.0));
    }

    #[test]
    fn white_mask_never_blocks_and_recycles() {
        let mut rng = StdRng::seed_from_u64(5);
        let mask = PixelBuffer::filled(100, 100, WHITE);
        let mut s = one_drop(0.0, SPAWN_Y);
        let mut lowest = SPAWN_Y;
        let mut recycled_at = None;
        for frame in 0..2000 {
            let stats = step(&mut s, &mask, DT, &mut rng);
            assert_eq!(stats.blocked, 0);
            let d = first(&s);
            assert!(!d.blocked);
            if stats.recycled == 1 {
                assert_eq!(d.y, SPAWN_Y);
                assert!((-1.0..=1.0).contains(&d.x));
                assert_eq!((d.x * 100.0).round() / 100.0, d.x);
                recycled_at = Some(frame);
                break;
            }
            lowest = lowest.min(d.y);
        }
        assert!(recycled_at.is_some());
        assert!(lowest < -1.0);
    }

    #[test]
    fn dark_cell_blocks_and_never_speeds_descent() {
        let mut rng = StdRng::seed_from_u64(9);
        let mask = PixelBuffer::filled(100, 100, BLACK);
        let mut s = one_drop(0.0, 0.5);
        s.get_mut(DropId(0)).unwrap().vy = -0.4;

        let vy_before = first(&s).vy;
        detect(&mut s, &mask);
        assert!(first(&s).blocked);
        assert!(first(&s).vy >= vy_before);
        assert!((first(&s).vy - 0.1).abs() < 1e-6);

        let vy_before = first(&s).vy;
        rise(&mut s, &mask, DT);
        deflect(&mut s, &mask, DT, &mut rng);
        assert!(first(&s).vy >= vy_before);
    }

    #[test]
    fn slow_descent_is_not_inverted() {
        let mask = PixelBuffer::filled(10, 10, BLACK);
        let mut s = one_drop(0.0, 0.0);
        s.get_mut(DropId(0)).unwrap().vy = -0.0005;
        detect(&mut s, &mask);
        assert!(first(&s).blocked);
        assert_eq!(first(&s).vy, -0.0005);
    }

    #[test]
    fn outside_view_never_collides() {
        let mask = PixelBuffer::filled(10, 10, BLACK);
        for (x, y) in [(0.0, 1.1), (1.0, 0.0), (-1.05, 0.0), (0.0, -1.0)] {
            let mut s = one_drop(x, y);
            detect(&mut s, &mask);
            assert!(!first(&s).blocked, "({x},{y})");
        }
    }

    #[test]
    fn rise_escapes_to_first_free_row() {
        // rows 40..=60 dark
        let mut mask = PixelBuffer::filled(100, 100, WHITE);
        for row in 40..=60 {
            for col in 0..100 {
                mask.set_pixel(col, row, BLACK);
            }
        }
        let mut s = one_drop(0.0, row_to_scene_y(50, 100));
        detect(&mut s, &mask);
        assert!(first(&s).blocked);
        rise(&mut s, &mask, DT);
        let d = first(&s);
        let row = scene_y_to_row(d.y, 100);
        assert!(row < 40, "row {row}");
        assert!(row >= 38, "row {row}");
        assert!(d.vy > 0.0);
    }

    #[test]
    fn rise_in_fully_dark_column_terminates() {
        let mask = PixelBuffer::filled(50, 50, BLACK);
        let mut s = one_drop(0.0, -0.9);
        detect(&mut s, &mask);
        rise(&mut s, &mask, DT);
        let d = first(&s);
        assert!(d.y > 1.0 && d.y <= SPAWN_Y);
    }

    #[test]
    fn rise_with_zero_dt_does_not_spin() {
        let mask = PixelBuffer::filled(50, 50, BLACK);
        let mut s = one_drop(0.0, 0.0);
        detect(&mut s, &mask);
        rise(&mut s, &mask, 0.0);
        assert_eq!(first(&s).y, 0.0);
    }

    #[test]
    fn first_contact_assigns_palette_colour_once() {
        let mut rng = StdRng::seed_from_u64(21);
        let mask = PixelBuffer::filled(20, 20, BLACK);
        let mut s = one_drop(0.0, 0.0);
        assert_eq!(first(&s).color, PLACEHOLDER_COLOR);
        detect(&mut s, &mask);
        deflect(&mut s, &mask, DT, &mut rng);
        let c = first(&s).color;
        assert!(PALETTE.contains(&c));
        assert!(first(&s).color_assigned);
        for _ in 0..10 {
            deflect(&mut s, &mask, DT, &mut rng);
            assert_eq!(first(&s).color, c);
        }
    }

    #[test]
    fn obstacle_on_left_pushes_right() {
        // dark only in columns 0..=49 of the row below the drop
        let mut rng = StdRng::seed_from_u64(2);
        let mut mask = PixelBuffer::filled(100, 100, WHITE);
        for col in 0..50 {
            mask.set_pixel(col, 51, BLACK);
        }
        let mut s = one_drop(0.0, 0.0); // cell (50, 50)
        {
            let d = s.get_mut(DropId(0)).unwrap();
            d.blocked = true;
            d.cell = (50, 50);
        }
        deflect(&mut s, &mask, DT, &mut rng);
        let d = first(&s);
        // j = 1..9 see the obstacle on the left, nothing on the right
        assert!(d.x > 0.0);
        assert!(d.rotation < 0.0);
        assert!(d.vx > 0.0);
    }

    #[test]
    fn obstacle_on_right_pushes_left() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut mask = PixelBuffer::filled(100, 100, WHITE);
        for col in 51..100 {
            mask.set_pixel(col, 51, BLACK);
        }
        let mut s = one_drop(0.0, 0.0);
        {
            let d = s.get_mut(DropId(0)).unwrap();
            d.blocked = true;
            d.cell = (50, 50);
        }
        deflect(&mut s, &mask, DT, &mut rng);
        let d = first(&s);
        assert!(d.x < 0.0);
        assert!(d.rotation > 0.0);
        assert!(d.vx < 0.0);
    }

    #[test]
    fn obstacles_on_both_sides_cancel() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut mask = PixelBuffer::filled(100, 100, WHITE);
        for col in 0..100 {
            mask.set_pixel(col, 51, BLACK);
        }
        let mut s = one_drop(0.0, 0.0);
        {
            let d = s.get_mut(DropId(0)).unwrap();
            d.blocked = true;
            d.cell = (50, 50);
        }
        deflect(&mut s, &mask, DT, &mut rng);
        let d = first(&s);
        assert!(d.x.abs() < 1e-6);
        assert!(d.rotation.abs() < 1e-6);
        assert!(d.vx.abs() < 1e-6);
        assert!(d.color_assigned);
    }

    #[test]
    fn side_checks_past_image_edge_read_background() {
        let mut rng = StdRng::seed_from_u64(4);
        let mask = PixelBuffer::filled(10, 10, WHITE);
        let mut s = one_drop(-0.99, 0.0);
        {
            let d = s.get_mut(DropId(0)).unwrap();
            d.blocked = true;
            d.cell = (0, 9); // row below is 10: off the image
        }
        deflect(&mut s, &mask, DT, &mut rng);
        let d = first(&s);
        assert_eq!(d.x, -0.99);
        assert_eq!(d.rotation, 0.0);
    }

    #[test]
    fn leaving_the_top_unblocks() {
        let mask = PixelBuffer::filled(10, 10, BLACK);
        let mut s = one_drop(0.0, 1.05);
        s.get_mut(DropId(0)).unwrap().blocked = true;
        detect(&mut s, &mask);
        assert!(!first(&s).blocked);
    }
}
