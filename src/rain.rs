// Raindrops: the particle records, their store, and the word spawner.
// Visual: words appear just above the top edge, one letter per drop, reading
// left to right, and drift down; drops that leave the bottom reappear at the top.

use crate::config::SimulationConfig;
use rand::Rng;

/// 0x00RRGGBB, same packing as the screen buffer.
pub type Color = u32;

pub const PLACEHOLDER_COLOR: Color = 0x00_00_00_00;

/// Colours a drop takes on the first time it lands on something.
pub const PALETTE: [Color; 6] = [
    0x00_FF_00_00, // red
    0x00_00_00_FF, // blue
    0x00_00_FF_00, // green
    0x00_FF_FF_00, // yellow
    0x00_00_FF_FF, // cyan
    0x00_80_00_80, // purple
];

/// Just above the visible top edge.
pub const SPAWN_Y: f32 = 1.2;
/// Below this a drop is recycled to `SPAWN_Y`.
pub const RECYCLE_Y: f32 = -1.2;
/// Horizontal offset between consecutive letters of a word.
pub const LETTER_STRIDE: f32 = 1.0 / 30.0;

const DEFAULT_TEXT: &str = "I never meant to cause you any sorrow
    I never meant to cause you any pain
    I only wanted one time to see you laughing
    I only wanted to see you
    Laughing in the purple rain
    Purple rain, purple rain
    I only want to see you
    Laughing in the purple rain";

/// Stable handle: the index a drop was pushed at. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DropId(pub usize);

/// One falling letter. All of its state lives here so recycling touches one record.
#[derive(Clone, Debug, PartialEq)]
pub struct Raindrop {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    /// Visual stretch (x, y); cosmetic only.
    pub scale: (f32, f32),
    pub blocked: bool,
    pub color_assigned: bool,
    pub color: Color,
    pub glyph: char,
    /// Mask cell under the drop as of the last collision pass.
    pub cell: (i64, i64),
}

impl Raindrop {
    pub fn new(x: f32, glyph: char) -> Self {
        Self {
            x,
            y: SPAWN_Y,
            vx: 0.0,
            vy: 0.0,
            rotation: 0.0,
            scale: (1.0, 1.0),
            blocked: false,
            color_assigned: false,
            color: PLACEHOLDER_COLOR,
            glyph,
            cell: (-1, -1),
        }
    }

    /// Back to the top at a new x. Velocity and rotation carry over.
    pub fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.y = SPAWN_Y;
        self.x = random_scene_x(rng);
        self.color_assigned = false;
        self.color = PLACEHOLDER_COLOR;
    }
}

/// Uniform pick from the 201 hundredths in [-1, 1].
pub fn random_scene_x<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(-100i32..=100) as f32 / 100.0
}

/// Append-only collection of drops.
#[derive(Default, Debug)]
pub struct RaindropStore {
    drops: Vec<Raindrop>,
}

impl RaindropStore {
    pub fn new() -> Self {
        Self { drops: Vec::new() }
    }

    pub fn push(&mut self, drop: Raindrop) -> DropId {
        self.drops.push(drop);
        DropId(self.drops.len() - 1)
    }

    #[inline] pub fn len(&self) -> usize { self.drops.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.drops.is_empty() }

    pub fn get(&self, id: DropId) -> Option<&Raindrop> { self.drops.get(id.0) }
    pub fn get_mut(&mut self, id: DropId) -> Option<&mut Raindrop> { self.drops.get_mut(id.0) }

    pub fn iter(&self) -> impl Iterator<Item = &Raindrop> { self.drops.iter() }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Raindrop> { self.drops.iter_mut() }
}

/// Words to rain, already split. Never empty.
#[derive(Clone, Debug)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Whitespace-split `text`; `None` when it has no words at all.
    pub fn from_text(text: &str) -> Option<Self> {
        let words: Vec<String> = text
            .split_whitespace()
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
            .collect();
        (!words.is_empty()).then_some(Self { words })
    }

    pub fn len(&self) -> usize { self.words.len() }
    pub fn is_empty(&self) -> bool { self.words.is_empty() }
    pub fn words(&self) -> &[String] { &self.words }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.words[rng.random_range(0..self.words.len())]
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self::from_text(DEFAULT_TEXT).unwrap_or_else(|| Self { words: vec!["rain".into()] })
    }
}

/// Rate-limited word spawner.
#[derive(Debug)]
pub struct Spawner {
    words: WordList,
    frames_since_spawn: u32,
}

impl Spawner {
    pub fn new(words: WordList) -> Self {
        Self { words, frames_since_spawn: 0 }
    }

    /// Called once per frame. Spawns one word every `spawn_interval` frames while
    /// the store is below the cap; letters past the cap are dropped.
    /// Returns how many drops were created.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        store: &mut RaindropStore,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> usize {
        if store.len() >= config.population_cap {
            return 0;
        }
        self.frames_since_spawn += 1;
        if self.frames_since_spawn < config.spawn_interval {
            return 0;
        }
        self.frames_since_spawn = 0;
        self.spawn_word(store, config.population_cap, rng)
    }

    fn spawn_word<R: Rng + ?Sized>(&mut self, store: &mut RaindropStore, cap: usize, rng: &mut R) -> usize {
        let word = self.words.pick(rng);
        let base_x = random_scene_x(rng);
        let room = cap.saturating_sub(store.len());
        let mut made = 0;
        for (i, ch) in word.chars().take(room).enumerate() {
            store.push(Raindrop::new(base_x + i as f32 * LETTER_STRIDE, ch));
            made += 1;
        }
        log::debug!("spawned '{word}' at x={base_x:.2} ({made} drops, {} live)", store.len());
        made
    }
}
