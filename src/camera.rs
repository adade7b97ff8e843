// Opens a camera and converts its frames into RGBA for the pipeline.
// Visual expectation: each `current_frame()` is the newest picture the camera saw,
// unmirrored; the pipeline does the flipping.

use crate::error::Error;
use crate::source::{DeviceInfo, DeviceListener, VideoSource};
use crate::types::{CHANNELS, PixelBuffer};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution,
    },
};

/// Ask the OS which cameras exist and hand the list to `listener`.
pub fn enumerate_devices(listener: &mut dyn DeviceListener) -> Result<Vec<DeviceInfo>, Error> {
    let found = query(ApiBackend::Auto)
        .map_err(|e| Error::CameraInit(format!("Query devices: {e}")))?;

    let devices: Vec<DeviceInfo> = found
        .iter()
        .filter_map(|info| {
            // Only numbered devices can be reopened through `--camera`.
            let index = info.index().as_index().ok()?;
            Some(DeviceInfo { index, name: info.human_name() })
        })
        .collect();

    log::info!("found {} capture device(s)", devices.len());
    listener.devices_changed(&devices);
    Ok(devices)
}

// A small wrapper around nokhwa::Camera so the main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    index: u32,
    frame: PixelBuffer,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (the driver may pick another).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        let actual = cam.resolution();
        log::info!("camera {index} streaming at {}x{}", actual.width(), actual.height());

        Ok(Self {
            cam,
            index,
            frame: PixelBuffer::blank(actual.width() as usize, actual.height() as usize),
        })
    }

    /// Pull one frame and decode it into the internal RGBA buffer (alpha 255).
    /// Blocks until the camera delivers.
    pub fn grab(&mut self) -> Result<(), Error> {
        let raw = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb = raw
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        if self.frame.dimensions() != (w, h) {
            log::info!("camera {} resolution changed to {w}x{h}", self.index);
            self.frame = PixelBuffer::blank(w, h);
        }

        for (dst, src) in self.frame.data_mut().chunks_exact_mut(CHANNELS).zip(rgb.as_raw().chunks_exact(3)) {
            dst[0] = src[0];
            dst[1] = src[1];
            dst[2] = src[2];
            dst[3] = 255;
        }
        Ok(())
    }
}

impl VideoSource for CameraCapture {
    /// A failed grab is logged and reported as "no frame this tick".
    fn current_frame(&mut self) -> Option<&PixelBuffer> {
        match self.grab() {
            Ok(()) => Some(&self.frame),
            Err(e) => {
                log::warn!("{e}; skipping frame");
                None
            }
        }
    }

    fn label(&self) -> String {
        format!("camera {}", self.index)
    }
}
