// Scene <-> image coordinate conversion.
// Scene space: [-1,1] on both axes, origin at center, +y up.
// Image space: column/row in pixels, origin top-left, +row down.
// Results are not clamped; the pixel accessors treat anything outside the
// image as background.

#[inline]
pub fn scene_x_to_column(x: f32, width: usize) -> i64 {
    ((x + 1.0) * (width as f32 / 2.0)).floor() as i64
}

#[inline]
pub fn scene_y_to_row(y: f32, height: usize) -> i64 {
    height as i64 - ((y + 1.0) * (height as f32 / 2.0)).floor() as i64
}

#[inline]
pub fn column_to_scene_x(col: i64, width: usize) -> f32 {
    col as f32 / (width as f32 / 2.0) - 1.0
}

/// Inverse of `scene_y_to_row`, flipping back to +y up.
#[inline]
pub fn row_to_scene_y(row: i64, height: usize) -> f32 {
    1.0 - row as f32 / (height as f32 / 2.0)
}

/// Scene point -> (column, row).
#[inline]
pub fn scene_to_cell(x: f32, y: f32, width: usize, height: usize) -> (i64, i64) {
    (scene_x_to_column(x, width), scene_y_to_row(y, height))
}

/// True inside the open visible rectangle |x|<1, |y|<1.
#[inline]
pub fn in_view(x: f32, y: f32) -> bool {
    x > -1.0 && x < 1.0 && y > -1.0 && y < 1.0
}

/// Scene point -> fractional pixel position (used for drawing, not collision).
#[inline]
pub fn scene_to_pixel_f(x: f32, y: f32, width: usize, height: usize) -> (f32, f32) {
    ((x + 1.0) * width as f32 / 2.0, (1.0 - y) * height as f32 / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> impl Iterator<Item = f32> {
        (0..=400).map(|i| -1.0 + i as f32 * 0.005)
    }

    #[test]
    fn column_round_trip_within_one_pixel() {
        for w in [1usize, 2, 3, 100, 640, 1279] {
            for x in samples() {
                let back = column_to_scene_x(scene_x_to_column(x, w), w);
                assert!((back - x).abs() <= 2.0 / w as f32 + 1e-5, "x={x} w={w} back={back}");
            }
        }
    }

    #[test]
    fn row_round_trip_within_one_pixel() {
        for h in [1usize, 2, 3, 100, 480, 719] {
            for y in samples() {
                let back = row_to_scene_y(scene_y_to_row(y, h), h);
                assert!((back - y).abs() <= 2.0 / h as f32 + 1e-5, "y={y} h={h} back={back}");
            }
        }
    }

    #[test]
    fn corners_and_center() {
        assert_eq!(scene_x_to_column(-1.0, 100), 0);
        assert_eq!(scene_x_to_column(0.0, 100), 50);
        assert_eq!(scene_x_to_column(1.0, 100), 100); // one past the last column
        assert_eq!(scene_y_to_row(1.0, 100), 0);
        assert_eq!(scene_y_to_row(0.0, 100), 50);
        assert_eq!(scene_y_to_row(-1.0, 100), 100);
        assert_eq!(row_to_scene_y(0, 100), 1.0);
        assert_eq!(column_to_scene_x(0, 100), -1.0);
    }

    #[test]
    fn rows_grow_downward() {
        assert!(scene_y_to_row(0.5, 200) < scene_y_to_row(-0.5, 200));
    }

    #[test]
    fn view_rectangle_is_open() {
        assert!(in_view(0.0, 0.0));
        assert!(in_view(0.999, -0.999));
        assert!(!in_view(1.0, 0.0));
        assert!(!in_view(0.0, -1.0));
        assert!(!in_view(0.0, 1.2));
    }
}
