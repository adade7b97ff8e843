// One animation frame of text rain:
//   latest camera frame -> mirror -> grayscale (display) -> threshold (mask)
//   -> spawn words -> move/collide drops against the mask.
// Nothing here draws; the window reads `display_image()` and `sprites()` afterwards.

use crate::config::SimulationConfig;
use crate::physics::{self, StepStats};
use crate::rain::{Color, RaindropStore, Spawner, WordList};
use crate::source::VideoSource;
use crate::types::PixelBuffer;
use crate::vision::{grayscale_in_place, mirror, threshold};
use rand::Rng;

/// What the renderer needs to draw one drop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: (f32, f32),
    pub color: Color,
    pub glyph: char,
}

pub struct RainApp<R: Rng> {
    display: Option<PixelBuffer>,
    mask: Option<PixelBuffer>,
    drops: RaindropStore,
    spawner: Spawner,
    rng: R,
    frames: u64,
}

impl<R: Rng> RainApp<R> {
    pub fn new(words: WordList, rng: R) -> Self {
        Self {
            display: None,
            mask: None,
            drops: RaindropStore::new(),
            spawner: Spawner::new(words),
            rng,
            frames: 0,
        }
    }

    /// Poll `source` once and advance. See `update`.
    pub fn tick<S: VideoSource + ?Sized>(&mut self, source: &mut S, config: &SimulationConfig, dt: f32) -> Option<StepStats> {
        let frame = source.current_frame();
        self.update(frame, config, dt)
    }

    /// Advance one frame. With no frame this is a no-op and returns `None`.
    pub fn update(&mut self, frame: Option<&PixelBuffer>, config: &SimulationConfig, dt: f32) -> Option<StepStats> {
        let frame = frame?;
        let (w, h) = frame.dimensions();

        if self.display.as_ref().map(PixelBuffer::dimensions) != Some((w, h)) {
            log::info!("allocating {w}x{h} display/mask buffers");
        }
        let mut display = PixelBuffer::create_or_resize(self.display.take(), w, h);
        let mut mask = PixelBuffer::create_or_resize(self.mask.take(), w, h);

        mirror(frame, &mut display);
        grayscale_in_place(&mut display);
        threshold(&display, &mut mask, config.clamped_threshold());

        self.spawner.tick(&mut self.drops, config, &mut self.rng);
        let stats = physics::step(&mut self.drops, &mask, dt, &mut self.rng);

        self.display = Some(display);
        self.mask = Some(mask);
        self.frames += 1;
        Some(stats)
    }

    /// Grayscale mirrored frame, or the mask when `debugging` is on.
    pub fn display_image(&self, config: &SimulationConfig) -> Option<&PixelBuffer> {
        if config.debugging { self.mask.as_ref() } else { self.display.as_ref() }
    }

    pub fn mask(&self) -> Option<&PixelBuffer> {
        self.mask.as_ref()
    }

    pub fn drops(&self) -> &RaindropStore {
        &self.drops
    }

    pub fn drops_mut(&mut self) -> &mut RaindropStore {
        &mut self.drops
    }

    /// Frames actually simulated (skipped ticks not counted).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sprites(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.drops.iter().map(|d| Sprite {
            x: d.x,
            y: d.y,
            rotation: d.rotation,
            scale: d.scale,
            color: d.color,
            glyph: d.glyph,
        })
    }
}
