//! Binary pixel buffers.
//!
//! [`Bitmap`] owns a row-major buffer of 0/1 values. [`PixelView`] is the
//! read-only borrow the tracer works from; it is `Copy` and `Sync`, so the
//! recursive tracer can hand it to both halves of a split at once.

use std::path::Path;

use image::{GrayImage, ImageReader, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::config::{ThresholdMethod, TracingConfig};
use crate::error::TraceError;
use crate::geom::Rect;

/// Owned binary image: 1 = foreground, 0 = background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Bitmap {
    /// Wrap an existing row-major buffer.
    ///
    /// Fails if the length does not match the dimensions or any value is
    /// not 0 or 1.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, TraceError> {
        check_buffer(&data, width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// An all-background bitmap.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    /// Create from a grayscale image (non-zero = foreground).
    pub fn from_gray(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        let data = img.pixels().map(|p| u8::from(p.0[0] > 0)).collect();
        Self {
            data,
            width: w as usize,
            height: h as usize,
        }
    }

    /// Convert back to a grayscale image (foreground = 255).
    pub fn to_gray(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.get(x as usize, y as usize) * 255])
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The full image as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Pixel value at (x, y). Panics when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        self.data[y * self.width + x] = u8::from(on);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Borrow as a read-only view.
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Read-only view of a binary buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelView<'a> {
    /// Borrow a caller-owned buffer, validating it the same way as
    /// [`Bitmap::new`].
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, TraceError> {
        check_buffer(data, width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != 0
    }

    /// True if any pixel inside `rect` is foreground.
    pub fn region_not_empty(&self, rect: Rect) -> bool {
        (rect.y..rect.bottom()).any(|y| {
            let row = y * self.width;
            self.data[row + rect.x..row + rect.right()]
                .iter()
                .any(|&v| v != 0)
        })
    }

    /// Sum of a horizontal run of `len` pixels starting at (x, y).
    pub(crate) fn row_sum(&self, x: usize, y: usize, len: usize) -> usize {
        let start = y * self.width + x;
        self.data[start..start + len]
            .iter()
            .map(|&v| v as usize)
            .sum()
    }

    /// Sum of a vertical run of `len` pixels starting at (x, y).
    pub(crate) fn column_sum(&self, x: usize, y: usize, len: usize) -> usize {
        (y..y + len).map(|yy| self.get(x, yy) as usize).sum()
    }
}

fn check_buffer(data: &[u8], width: usize, height: usize) -> Result<(), TraceError> {
    if width.checked_mul(height) != Some(data.len()) {
        return Err(TraceError::BufferSize {
            width,
            height,
            len: data.len(),
        });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, &v)| v > 1) {
        return Err(TraceError::NonBinaryPixel { index, value });
    }
    Ok(())
}

/// Load an image and convert it to a binary bitmap.
///
/// Dark pixels become foreground (1), light pixels background (0).
pub fn load_and_threshold(path: &Path, config: &TracingConfig) -> Result<Bitmap, TraceError> {
    let img = ImageReader::open(path)
        .map_err(|e| TraceError::ImageLoad(e.to_string()))?
        .decode()
        .map_err(|e| TraceError::ImageLoad(e.to_string()))?
        .into_luma8();

    Ok(threshold_gray(&img, config))
}

/// Binarise an already-decoded grayscale image.
pub fn threshold_gray(img: &GrayImage, config: &TracingConfig) -> Bitmap {
    let level = match config.threshold {
        ThresholdMethod::Fixed(t) => t,
        ThresholdMethod::Otsu => {
            let t = otsu_level(img);
            tracing::debug!(level = t, "otsu threshold");
            t
        }
    };

    let binary = threshold(img, level, ThresholdType::BinaryInverted);
    let mut bitmap = Bitmap::from_gray(&binary);

    if config.invert {
        for v in bitmap.as_mut_slice() {
            *v ^= 1;
        }
    }

    if std::env::var("IMG2SKEL_DEBUG_BITMAP").is_ok() {
        if let Err(e) = bitmap.to_gray().save("debug_threshold.png") {
            tracing::warn!("could not save debug_threshold.png: {e}");
        } else {
            eprintln!("  Debug       saved debug_threshold.png");
        }
    }

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = Bitmap::new(3, 3, vec![0; 8]).unwrap_err();
        assert!(matches!(
            err,
            TraceError::BufferSize {
                width: 3,
                height: 3,
                len: 8
            }
        ));
    }

    #[test]
    fn rejects_non_binary_values() {
        let mut data = vec![0; 9];
        data[4] = 255;
        let err = PixelView::new(&data, 3, 3).unwrap_err();
        assert!(matches!(
            err,
            TraceError::NonBinaryPixel {
                index: 4,
                value: 255
            }
        ));
    }

    #[test]
    fn region_emptiness() {
        let mut bm = Bitmap::blank(8, 8);
        bm.set(6, 1, true);
        let view = bm.view();
        assert!(view.region_not_empty(Rect::new(4, 0, 4, 4)));
        assert!(!view.region_not_empty(Rect::new(0, 0, 6, 8)));
        assert!(!view.region_not_empty(Rect::new(0, 2, 8, 6)));
    }

    #[test]
    fn dark_ink_becomes_foreground() {
        let mut img = GrayImage::from_pixel(4, 4, Luma([255]));
        img.put_pixel(1, 2, Luma([0]));
        let config = TracingConfig {
            threshold: ThresholdMethod::Fixed(128),
            ..TracingConfig::default()
        };
        let bm = threshold_gray(&img, &config);
        assert_eq!(bm.count_foreground(), 1);
        assert_eq!(bm.get(1, 2), 1);

        let inverted = threshold_gray(
            &img,
            &TracingConfig {
                invert: true,
                ..config
            },
        );
        assert_eq!(inverted.count_foreground(), 15);
    }

    #[test]
    fn gray_round_trip() {
        let mut bm = Bitmap::blank(5, 3);
        bm.set(4, 2, true);
        bm.set(0, 0, true);
        assert_eq!(Bitmap::from_gray(&bm.to_gray()), bm);
    }
}
