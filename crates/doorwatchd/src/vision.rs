//! HTTP client for the face encoding service.
//!
//! The service receives a PNG frame (`Content-Type: image/png`) and answers
//! `{"encodings": [[f32, ...], ...]}`, one vector per detected face.

use doorwatch_core::notification::encode_png;
use doorwatch_core::{Embedding, FaceEncoder, VisionError};
use image::RgbImage;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct EncodeReply {
    encodings: Vec<Vec<f32>>,
}

pub struct HttpFaceEncoder {
    client: Client,
    endpoint: String,
}

impl HttpFaceEncoder {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

fn parse_reply(body: &str) -> Result<Vec<Embedding>, VisionError> {
    let reply: EncodeReply =
        serde_json::from_str(body).map_err(|e| VisionError::InvalidResponse(e.to_string()))?;
    Ok(reply.encodings.into_iter().map(Embedding::new).collect())
}

impl FaceEncoder for HttpFaceEncoder {
    fn detect_and_encode(&mut self, frame: &RgbImage) -> Result<Vec<Embedding>, VisionError> {
        let png = encode_png(frame)?;
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| VisionError::Request(e.to_string()))?;
        let body = response
            .text()
            .map_err(|e| VisionError::Request(e.to_string()))?;

        let encodings = parse_reply(&body)?;
        tracing::debug!(faces = encodings.len(), "frame encoded");
        Ok(encodings)
    }
}
