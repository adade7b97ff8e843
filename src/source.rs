// Where frames come from.
// The simulation polls `current_frame()` once per tick; `None` means "nothing
// yet" and the tick is skipped. Frame size may change between polls.

use crate::error::Error;
use crate::types::PixelBuffer;
use std::path::Path;

pub trait VideoSource {
    /// Latest RGBA frame, or `None` if the source has nothing to show yet.
    fn current_frame(&mut self) -> Option<&PixelBuffer>;

    /// Human-readable label for logs.
    fn label(&self) -> String;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn current_frame(&mut self) -> Option<&PixelBuffer> {
        (**self).current_frame()
    }

    fn label(&self) -> String {
        (**self).label()
    }
}

/// One capture device as reported by enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: u32,
    pub name: String,
}

/// Gets told when the list of capture devices is (re)discovered.
pub trait DeviceListener {
    fn devices_changed(&mut self, devices: &[DeviceInfo]);
}

impl<F: FnMut(&[DeviceInfo])> DeviceListener for F {
    fn devices_changed(&mut self, devices: &[DeviceInfo]) {
        self(devices)
    }
}

/// Serves the same decoded image on every tick.
/// Visual: a frozen backdrop the rain still collides with.
pub struct StillImageSource {
    name: String,
    frame: PixelBuffer,
}

impl StillImageSource {
    pub fn new(name: impl Into<String>, frame: PixelBuffer) -> Self {
        Self { name: name.into(), frame }
    }

    /// Decode any format the `image` crate understands into RGBA.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let rgba = image::open(path)
            .map_err(|e| Error::ImageLoad(format!("{}: {e}", path.display())))?
            .to_rgba8();
        let (w, h) = rgba.dimensions();
        let frame = PixelBuffer::from_rgba(w as usize, h as usize, rgba.into_raw())
            .ok_or_else(|| Error::ImageLoad(format!("{}: unexpected pixel layout", path.display())))?;
        log::info!("fallback image {} ({w}x{h})", path.display());
        Ok(Self::new(path.display().to_string(), frame))
    }
}

impl VideoSource for StillImageSource {
    fn current_frame(&mut self) -> Option<&PixelBuffer> {
        Some(&self.frame)
    }

    fn label(&self) -> String {
        format!("still image {}", self.name)
    }
}
