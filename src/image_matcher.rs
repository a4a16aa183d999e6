//! Pixel-level image comparison and the matchers built on it.
//!
//! Two images match when they have the same size and the share of pixels
//! that differ stays within [`ImageCompareConfig::allowed_percent_different_pixels`].
//! Pixels closer than [`ImageCompareConfig::pixel_tolerance`] count as equal.

use crate::{Description, ImageCompareConfig, Matcher, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DIFF_MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]);

// ── Comparison ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonState {
    Match,
    Mismatch,
    SizeMismatch,
}

/// Outcome of [`compare_images`].
#[derive(Debug, Clone)]
pub struct ImageComparison {
    pub state: ComparisonState,

    /// Percentage (0–100) of pixels that differ. Zero on a size mismatch.
    pub percent_different: f64,

    /// The actual image with every differing pixel painted red. For a size
    /// mismatch this is the actual image unchanged.
    pub diff_image: Option<RgbaImage>,
}

/// Compare `actual` against `expected`.
pub fn compare_images(
    expected: &DynamicImage,
    actual: &DynamicImage,
    config: &ImageCompareConfig,
) -> ImageComparison {
    let expected = expected.to_rgba8();
    let actual = actual.to_rgba8();

    if expected.dimensions() != actual.dimensions() {
        debug!(expected = ?expected.dimensions(), actual = ?actual.dimensions(), "image size mismatch");
        return ImageComparison {
            state: ComparisonState::SizeMismatch,
            percent_different: 0.0,
            diff_image: Some(actual),
        };
    }

    let mut diff = actual.clone();
    let mut different = 0u64;
    for (x, y, pixel) in actual.enumerate_pixels() {
        if is_different(expected.get_pixel(x, y), pixel, config.pixel_tolerance) {
            diff.put_pixel(x, y, DIFF_MARKER);
            different += 1;
        }
    }

    let total = u64::from(actual.width()) * u64::from(actual.height());
    let percent_different = if total == 0 {
        0.0
    } else {
        different as f64 * 100.0 / total as f64
    };

    if different == 0 || percent_different <= config.allowed_percent_different_pixels {
        ImageComparison {
            state: ComparisonState::Match,
            percent_different,
            diff_image: None,
        }
    } else {
        debug!(different, percent_different, "image mismatch");
        ImageComparison {
            state: ComparisonState::Mismatch,
            percent_different,
            diff_image: Some(diff),
        }
    }
}

fn is_different(expected: &Rgba<u8>, actual: &Rgba<u8>, tolerance: f64) -> bool {
    if expected == actual {
        return false;
    }
    if tolerance <= 0.0 {
        return true;
    }
    let distance_sq: f64 = expected.0[..3]
        .iter()
        .zip(&actual.0[..3])
        .map(|(e, a)| {
            let d = f64::from(*e) - f64::from(*a);
            d * d
        })
        .sum();
    let limit = tolerance * 255.0;
    distance_sq > limit * limit * 3.0
}

// ── ImageMatcher ─────────────────────────────────────────────────────────────

/// Matches images (decoded, as bytes, or as files) against an expected image.
///
/// On a mismatch the optional writer receives the diff image.
pub struct ImageMatcher {
    expected: DynamicImage,
    config: ImageCompareConfig,
    diff_writer: Option<Box<dyn Fn(&RgbaImage)>>,
}

impl ImageMatcher {
    pub fn new(expected: DynamicImage) -> Self {
        Self {
            expected,
            config: ImageCompareConfig::default(),
            diff_writer: None,
        }
    }

    pub fn with_config(mut self, config: ImageCompareConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_mismatch(mut self, writer: impl Fn(&RgbaImage) + 'static) -> Self {
        self.diff_writer = Some(Box::new(writer));
        self
    }

    fn match_image(&self, actual: &DynamicImage, mismatch: &mut Description) -> bool {
        let result = compare_images(&self.expected, actual, &self.config);
        let cause = match result.state {
            ComparisonState::Match => return true,
            ComparisonState::Mismatch => "image does not match.",
            ComparisonState::SizeMismatch => "size does not match.",
        };
        mismatch.append_text(cause);
        if let (Some(writer), Some(diff)) = (&self.diff_writer, &result.diff_image) {
            writer(diff);
        }
        false
    }
}

impl Matcher<DynamicImage> for ImageMatcher {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("should match exactly.");
    }

    fn matches(&self, item: &DynamicImage, mismatch: &mut Description) -> bool {
        self.match_image(item, mismatch)
    }
}

impl Matcher<[u8]> for ImageMatcher {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("should match exactly.");
    }

    fn matches(&self, item: &[u8], mismatch: &mut Description) -> bool {
        match image::load_from_memory(item) {
            Ok(actual) => self.match_image(&actual, mismatch),
            Err(e) => {
                mismatch.append_text(&format!("image could not be decoded: {e}"));
                false
            }
        }
    }
}

impl Matcher<Path> for ImageMatcher {
    fn describe_to(&self, description: &mut Description) {
        description.append_text("should match exactly.");
    }

    fn matches(&self, item: &Path, mismatch: &mut Description) -> bool {
        match image::open(item) {
            Ok(actual) => self.match_image(&actual, mismatch),
            Err(e) => {
                mismatch.append_text(&format!("image {} could not be read: {e}", item.display()));
                false
            }
        }
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn is_same_as(expected: DynamicImage) -> ImageMatcher {
    ImageMatcher::new(expected)
}

/// Like [`is_same_as`]; `writer` receives the diff image if the match fails.
pub fn is_same_as_with(expected: DynamicImage, writer: impl Fn(&RgbaImage) + 'static) -> ImageMatcher {
    ImageMatcher::new(expected).on_mismatch(writer)
}

/// Loads the expected image from a file.
pub fn is_same_as_path<P: AsRef<Path>>(expected: P) -> Result<ImageMatcher> {
    Ok(ImageMatcher::new(image::open(expected)?))
}

/// Loads the expected image from a file; the diff image is saved to `result`
/// if the match fails.
pub fn is_same_as_path_with_result<P, Q>(expected: P, result: Q) -> Result<ImageMatcher>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let result: PathBuf = result.as_ref().to_path_buf();
    Ok(is_same_as_path(expected)?.on_mismatch(move |diff| {
        if let Err(e) = diff.save(&result) {
            warn!(path = %result.display(), error = %e, "cannot save diff image");
        }
    }))
}

/// Decodes the expected image from encoded bytes (PNG, JPEG).
pub fn is_same_as_bytes(expected: &[u8]) -> Result<ImageMatcher> {
    Ok(ImageMatcher::new(image::load_from_memory(expected)?))
}

/// Like [`is_same_as_bytes`]; `consumer` receives the diff image encoded as
/// PNG if the match fails.
pub fn is_same_as_bytes_with(expected: &[u8], consumer: impl Fn(Vec<u8>) + 'static) -> Result<ImageMatcher> {
    Ok(is_same_as_bytes(expected)?.on_mismatch(move |diff| match encode_png(diff) {
        Ok(png) => consumer(png),
        Err(e) => warn!(error = %e, "cannot encode diff image"),
    }))
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
