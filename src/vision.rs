// Per-frame image pipeline: mirror -> grayscale -> threshold.
// Visual expectation: the display image is a mirrored gray copy of the camera,
// and the mask is pure black (obstacle) / white (free) at the chosen threshold.
//
// Every pass is total: a destination with the wrong size is reallocated to
// match the source before writing, never an error.

use crate::types::{PixelBuffer, CHANNELS};

#[inline]
fn match_size(src: &PixelBuffer, dst: &mut PixelBuffer) {
    if !dst.same_size(src) {
        *dst = PixelBuffer::blank(src.width(), src.height());
    }
}

/// Byte-for-byte copy of `src` into `dst`.
pub fn copy_pixels(src: &PixelBuffer, dst: &mut PixelBuffer) {
    match_size(src, dst);
    dst.data_mut().copy_from_slice(src.data());
}

/// Left-right flip: `dst[y][W-1-x] = src[y][x]` for all four channels.
/// Visual: moving your right hand moves the right side of the screen, like a mirror.
pub fn mirror(src: &PixelBuffer, dst: &mut PixelBuffer) {
    match_size(src, dst);
    let w = src.width();
    let row_bytes = w * CHANNELS;
    if row_bytes == 0 { return; }
    let s = src.data();
    let d = dst.data_mut();

    for (src_row, dst_row) in s.chunks_exact(row_bytes).zip(d.chunks_exact_mut(row_bytes)) {
        for x in 0..w {
            let si = x * CHANNELS;
            let di = (w - 1 - x) * CHANNELS;
            dst_row[di..di + CHANNELS].copy_from_slice(&src_row[si..si + CHANNELS]);
        }
    }
}

/// Same flip without a second buffer: swap pixel pairs (x, W-1-x) per row.
pub fn mirror_in_place(image: &mut PixelBuffer) {
    let w = image.width();
    let row_bytes = w * CHANNELS;
    if row_bytes == 0 { return; }
    for row in image.data_mut().chunks_exact_mut(row_bytes) {
        for x in 0..w / 2 {
            let (a, b) = (x * CHANNELS, (w - 1 - x) * CHANNELS);
            for c in 0..CHANNELS {
                row.swap(a + c, b + c);
            }
        }
    }
}

/// Average of the three colour channels, rounded to nearest (ties cannot occur: /3).
#[inline]
fn gray_of(r: u8, g: u8, b: u8) -> u8 {
    let sum = r as u16 + g as u16 + b as u16;
    ((sum + 1) / 3).min(255) as u8
}

/// `dst.rgb = round((r+g+b)/3)`, `dst.a = src.a`.
pub fn grayscale(src: &PixelBuffer, dst: &mut PixelBuffer) {
    match_size(src, dst);
    for (s, d) in src.data().chunks_exact(CHANNELS).zip(dst.data_mut().chunks_exact_mut(CHANNELS)) {
        let v = gray_of(s[0], s[1], s[2]);
        d[0] = v;
        d[1] = v;
        d[2] = v;
        d[3] = s[3];
    }
}

pub fn grayscale_in_place(image: &mut PixelBuffer) {
    for px in image.data_mut().chunks_exact_mut(CHANNELS) {
        let v = gray_of(px[0], px[1], px[2]);
        px[0] = v;
        px[1] = v;
        px[2] = v;
    }
}

/// Binary mask from a grayscale image: red >= t*255 -> white, else black.
/// `t` is clamped into [0,1]; alpha passes through.
pub fn threshold(src: &PixelBuffer, dst: &mut PixelBuffer, t: f32) {
    match_size(src, dst);
    let cut = t.clamp(0.0, 1.0) * 255.0;
    for (s, d) in src.data().chunks_exact(CHANNELS).zip(dst.data_mut().chunks_exact_mut(CHANNELS)) {
        let v = if s[0] as f32 >= cut { 255 } else { 0 };
        d[0] = v;
        d[1] = v;
        d[2] = v;
        d[3] = s[3];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small deterministic "noise" image so every test sees varied channels.
    fn noisy(w: usize, h: usize) -> PixelBuffer {
        let mut data = Vec::with_capacity(w * h * CHANNELS);
        let mut s: u32 = 0x1234_5678;
        for _ in 0..w * h * CHANNELS {
            s ^= s << 13;
            s ^= s >> 17;
            s ^= s << 5;
            data.push((s & 0xFF) as u8);
        }
        PixelBuffer::from_rgba(w, h, data).unwrap()
    }

    #[test]
    fn grayscale_averages_rgb_and_keeps_alpha() {
        let src = noisy(9, 5);
        let mut dst = PixelBuffer::blank(9, 5);
        grayscale(&src, &mut dst);
        for (s, d) in src.data().chunks_exact(4).zip(dst.data().chunks_exact(4)) {
            let expect = ((s[0] as f32 + s[1] as f32 + s[2] as f32) / 3.0).round().clamp(0.0, 255.0) as u8;
            assert_eq!(d[0], expect);
            assert_eq!(d[1], expect);
            assert_eq!(d[2], expect);
            assert_eq!(d[3], s[3]);
        }
    }

    #[test]
    fn grayscale_in_place_matches_out_of_place() {
        let src = noisy(6, 6);
        let mut out = PixelBuffer::blank(6, 6);
        grayscale(&src, &mut out);
        let mut inplace = src.clone();
        grayscale_in_place(&mut inplace);
        assert_eq!(inplace, out);
    }

    #[test]
    fn mirror_is_an_involution() {
        let src = noisy(7, 4);
        let mut once = PixelBuffer::blank(7, 4);
        let mut twice = PixelBuffer::blank(7, 4);
        mirror(&src, &mut once);
        mirror(&once, &mut twice);
        assert_eq!(twice, src);
        for y in 0..4i64 {
            for x in 0..7i64 {
                assert_eq!(once.get_pixel(6 - x, y), src.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn mirror_two_pixel_row_swaps() {
        let a = [1, 2, 3, 4];
        let b = [5, 6, 7, 8];
        let src = PixelBuffer::from_rgba(2, 1, [a, b].concat()).unwrap();
        let mut dst = PixelBuffer::blank(2, 1);
        mirror(&src, &mut dst);
        assert_eq!(dst.data(), [b, a].concat().as_slice());

        let mut inplace = src.clone();
        mirror_in_place(&mut inplace);
        assert_eq!(inplace, dst);
    }

    #[test]
    fn mirror_in_place_odd_width_keeps_center() {
        let src = noisy(5, 3);
        let mut out = PixelBuffer::blank(5, 3);
        mirror(&src, &mut out);
        let mut inplace = src.clone();
        mirror_in_place(&mut inplace);
        assert_eq!(inplace, out);
    }

    #[test]
    fn threshold_is_binary_and_idempotent() {
        let mut gray = noisy(8, 8);
        grayscale_in_place(&mut gray);
        for t in [0.0, 0.25, 0.5, 0.73, 1.0] {
            let mut once = PixelBuffer::blank(8, 8);
            threshold(&gray, &mut once, t);
            for (s, d) in gray.data().chunks_exact(4).zip(once.data().chunks_exact(4)) {
                assert!(d[0] == 0 || d[0] == 255);
                assert_eq!(d[0], d[1]);
                assert_eq!(d[1], d[2]);
                assert_eq!(d[3], s[3]);
            }
            let mut twice = PixelBuffer::blank(8, 8);
            threshold(&once, &mut twice, t);
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn threshold_uniform_images() {
        for v in [0u8, 50, 127, 128, 200, 255] {
            let src = PixelBuffer::filled(4, 4, [v, v, v, 200]);
            for t in [0.0f32, 0.3, 0.5, 1.0] {
                let mut dst = PixelBuffer::blank(4, 4);
                threshold(&src, &mut dst, t);
                let want = if v as f32 >= t * 255.0 { 255 } else { 0 };
                assert!(dst.data().chunks_exact(4).all(|p| p == [want, want, want, 200]));
            }
        }
    }

    #[test]
    fn threshold_black_and_white_at_half() {
        let black = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        let white = PixelBuffer::filled(3, 3, [255, 255, 255, 255]);
        let mut out = PixelBuffer::blank(3, 3);
        threshold(&black, &mut out, 0.5);
        assert_eq!(out, black);
        threshold(&white, &mut out, 0.5);
        assert_eq!(out, white);
    }

    #[test]
    fn threshold_clamps_out_of_range() {
        let src = PixelBuffer::filled(2, 2, [10, 10, 10, 255]);
        let mut out = PixelBuffer::blank(2, 2);
        threshold(&src, &mut out, -3.0);
        assert_eq!(out.get_red(0, 0), Some(255));
        threshold(&src, &mut out, 7.0);
        assert_eq!(out.get_red(0, 0), Some(0));
    }

    #[test]
    fn wrong_sized_destination_is_reallocated() {
        let src = noisy(4, 3);
        let mut dst = PixelBuffer::blank(1, 1);
        copy_pixels(&src, &mut dst);
        assert_eq!(dst, src);

        let mut dst = PixelBuffer::blank(9, 9);
        mirror(&src, &mut dst);
        assert_eq!(dst.dimensions(), (4, 3));
    }
}
