// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote image fetching and display sizing for report embedding.
//!
//! Images are buffered whole, dimensions are recovered from the header
//! bytes only, and the display size is capped at a fixed width while
//! preserving the aspect ratio. The cap only ever shrinks.

use crate::models::report::ReportImage;
use futures_util::{stream, StreamExt};
use std::time::Duration;

/// Maximum embedded image width in pixels.
pub const MAX_IMAGE_WIDTH: u32 = 450;

/// Per-request fetch timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Report items resolving their images concurrently.
const ITEM_CONCURRENCY: usize = 4;

/// Errors while resolving a single image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image fetch failed: {0}")]
    Fetch(String),

    #[error("Image decode failed: {0}")]
    Decode(String),
}

/// HTTP image fetcher.
#[derive(Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
}

impl ImageFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the complete body of an image URL into memory.
    ///
    /// One retry after a failed or timed-out attempt.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        match self.fetch_once(url).await {
            Ok(bytes) => Ok(bytes),
            Err(first) => {
                tracing::debug!(url, error = %first, "Image fetch failed, retrying once");
                self.fetch_once(url).await
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self
            .http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ImageError::Fetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| ImageError::Fetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Fetch(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Fetch one image and compute its bounded display size.
    pub async fn resolve(&self, url: &str) -> Result<ReportImage, ImageError> {
        let bytes = self.fetch(url).await?;
        let (width_px, height_px) = native_dimensions(&bytes).map(bounded)?;

        Ok(ReportImage {
            bytes,
            width_px,
            height_px,
        })
    }

    /// Resolve every image of one report item.
    pub async fn resolve_all(&self, urls: &[String]) -> Result<Vec<ReportImage>, ImageError> {
        let mut images = Vec::with_capacity(urls.len());
        for url in urls {
            images.push(self.resolve(url).await?);
        }
        Ok(images)
    }
}

/// Resolve the image lists of many report items through a bounded pool.
///
/// Output order matches input order. A failure inside an item logs a
/// warning and yields an empty image list for that item only.
pub async fn resolve_item_images(
    fetcher: &ImageFetcher,
    items: Vec<Vec<String>>,
) -> Vec<Vec<ReportImage>> {
    stream::iter(items.into_iter().enumerate())
        .map(|(index, urls)| async move {
            match fetcher.resolve_all(&urls).await {
                Ok(images) => images,
                Err(e) => {
                    tracing::warn!(
                        item = index,
                        error = %e,
                        "Image resolution failed; item continues without images"
                    );
                    Vec::new()
                }
            }
        })
        .buffered(ITEM_CONCURRENCY)
        .collect()
        .await
}

/// Native pixel dimensions from the image header bytes.
pub fn native_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let size = imagesize::blob_size(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    Ok((size.width as u32, size.height as u32))
}

/// Bounded display size: width capped at [`MAX_IMAGE_WIDTH`], height scaled
/// to preserve the aspect ratio. Images narrower than the cap pass through
/// unchanged.
pub fn bounded(native: (u32, u32)) -> (u32, u32) {
    let (native_width, native_height) = native;
    let width = native_width.min(MAX_IMAGE_WIDTH);
    if width == native_width {
        return (native_width, native_height);
    }

    let ratio = f64::from(native_width) / f64::from(native_height);
    let height = (f64::from(width) / ratio).round() as u32;
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid PNG: 1x1 RGBA.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, b'I',
        b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_wide_image_is_capped() {
        assert_eq!(bounded((900, 600)), (450, 300));
    }

    #[test]
    fn test_narrow_image_passes_through() {
        // The cap only ever shrinks, never grows.
        assert_eq!(bounded((300, 600)), (300, 600));
    }

    #[test]
    fn test_exact_cap_width_is_unchanged() {
        assert_eq!(bounded((450, 450)), (450, 450));
    }

    #[test]
    fn test_portrait_capped_keeps_ratio() {
        assert_eq!(bounded((900, 1800)), (450, 900));
    }

    #[test]
    fn test_native_dimensions_from_png_header() {
        assert_eq!(native_dimensions(PNG_1X1).unwrap(), (1, 1));
    }

    #[test]
    fn test_garbage_bytes_fail_decode() {
        let err = native_dimensions(b"not an image").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
