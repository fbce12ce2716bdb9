use crate::types::Embedding;
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("vision request failed: {0}")]
    Request(String),
    #[error("invalid vision response: {0}")]
    InvalidResponse(String),
    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Face detection plus encoding, one [`Embedding`] per face in detection order.
///
/// A frame with no faces yields an empty vector, not an error.
pub trait FaceEncoder {
    fn detect_and_encode(&mut self, frame: &RgbImage) -> Result<Vec<Embedding>, VisionError>;
}
