// Crate error type. Every variant states *where* things went wrong.
// The simulation core never returns these; only the camera/window/file edges do.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Pushing the screen buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting/enumerating the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("Image load error: {0}")]
    ImageLoad(String), // Reading/decoding the still fallback image failed
    #[error("Text load error: {0}")]
    TextLoad(String), // Reading the --text word file failed
    #[error("No video source available (camera failed and no --fallback given)")]
    NoVideoSource,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
