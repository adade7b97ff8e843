// Core pixel types shared by the pipeline, the simulation and the window.

/// Packed screen buffer for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

pub const CHANNELS: usize = 4;

/// Interleaved RGBA bytes, row-major, row 0 at the top.
/// `data.len() == 4 * width * height` always holds; the fields are private so
/// nothing can grow or shrink the byte array behind the dimensions' back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Every byte 0: black, fully transparent.
    pub fn blank(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0u8; width * height * CHANNELS] }
    }

    /// Wrap raw RGBA bytes. Returns `None` when the length does not match.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == width * height * CHANNELS).then_some(Self { width, height, data })
    }

    /// Build a buffer whose every pixel is `rgba`.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self { width, height, data }
    }

    /// Reuse `existing` if it already has the requested size, else allocate a blank one.
    pub fn create_or_resize(existing: Option<PixelBuffer>, width: usize, height: usize) -> PixelBuffer {
        match existing {
            Some(buf) if buf.width == width && buf.height == height => buf,
            _ => PixelBuffer::blank(width, height),
        }
    }

    #[inline] pub fn width(&self) -> usize { self.width }
    #[inline] pub fn height(&self) -> usize { self.height }
    #[inline] pub fn dimensions(&self) -> (usize, usize) { (self.width, self.height) }
    #[inline] pub fn data(&self) -> &[u8] { &self.data }
    #[inline] pub fn data_mut(&mut self) -> &mut [u8] { &mut self.data }

    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Byte offset of (col,row), or `None` if either is outside the image.
    #[inline]
    pub fn index_of(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 { return None; }
        let (c, r) = (col as usize, row as usize);
        if c >= self.width || r >= self.height { return None; }
        Some((r * self.width + c) * CHANNELS)
    }

    #[inline]
    fn channel(&self, col: i64, row: i64, offset: usize) -> Option<u8> {
        self.index_of(col, row).map(|i| self.data[i + offset])
    }

    #[inline] pub fn get_red(&self, col: i64, row: i64) -> Option<u8> { self.channel(col, row, 0) }
    #[inline] pub fn get_green(&self, col: i64, row: i64) -> Option<u8> { self.channel(col, row, 1) }
    #[inline] pub fn get_blue(&self, col: i64, row: i64) -> Option<u8> { self.channel(col, row, 2) }
    #[inline] pub fn get_alpha(&self, col: i64, row: i64) -> Option<u8> { self.channel(col, row, 3) }

    pub fn get_pixel(&self, col: i64, row: i64) -> Option<[u8; 4]> {
        self.index_of(col, row)
            .map(|i| [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Writes are silently dropped outside the image.
    pub fn set_pixel(&mut self, col: i64, row: i64, rgba: [u8; 4]) {
        if let Some(i) = self.index_of(col, row) {
            self.data[i..i + CHANNELS].copy_from_slice(&rgba);
        }
    }

    /// Obstacle test used by the collision engine: dark red channel, in bounds.
    /// Anything outside the image reads as background.
    #[inline]
    pub fn is_obstacle(&self, col: i64, row: i64) -> bool {
        self.get_red(col, row) == Some(0)
    }

    /// Pack RGBA into 0x00RRGGBB (alpha dropped) for the window.
    pub fn to_frame_buffer(&self, out: &mut FrameBuffer) {
        if out.width != self.width || out.height != self.height {
            *out = FrameBuffer::new(self.width, self.height);
        }
        for (dst, px) in out.pixels.iter_mut().zip(self.data.chunks_exact(CHANNELS)) {
            *dst = ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32;
        }
    }
}
