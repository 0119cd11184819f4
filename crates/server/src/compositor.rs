//! Design compositor.
//!
//! Flattens a garment base image and a user-uploaded logo into a single PNG
//! at a fixed canonical resolution. The whole pipeline is pixel-deterministic:
//! the same base, overlay, and transform always produce byte-identical
//! output. That keeps composite URLs stable across retries and makes the
//! output testable by digest.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use stitchpress_core::DesignTransform;

/// Canonical canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 800;
/// Canonical canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 1000;

/// Nominal overlay edge at 100% scale, before the transform is applied.
const OVERLAY_BASE_PX: u32 = 300;

/// Pixels per display unit of x/y offset. Offsets span ±50 display units,
/// so the overlay centre can travel ±200px from the canvas centre.
const DISPLAY_UNIT_PX: i32 = 4;

/// Errors from a composite attempt. Each is terminal for that attempt; the
/// caller retries with the same slider state.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The custom line has no uploaded logo to compose.
    #[error("no design uploaded")]
    NoDesignUploaded,

    /// The base or overlay image could not be decoded.
    #[error("image could not be loaded: {0}")]
    ImageLoadFailed(String),

    /// The composed PNG could not be encoded or stored.
    #[error("composite upload failed: {0}")]
    UploadFailed(String),

    /// Transform parameters outside the valid input domain.
    #[error("invalid transform: {0}")]
    InvalidTransform(#[from] stitchpress_core::DesignTransformError),
}

/// Stateless compositor over the canonical canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compositor;

impl Compositor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compose `overlay` onto `base` at `transform` and encode as PNG.
    ///
    /// The base is resized to fill the canvas; the overlay is resized to its
    /// nominal size times `scale/100`, rotated about its own centre, and
    /// alpha-blended at the canvas centre plus the scaled offset.
    ///
    /// # Errors
    ///
    /// Returns [`CompositeError::ImageLoadFailed`] when either input fails to
    /// decode, [`CompositeError::InvalidTransform`] for out-of-domain
    /// parameters, and [`CompositeError::UploadFailed`] when PNG encoding
    /// fails.
    pub fn compose(
        &self,
        base: &[u8],
        overlay: &[u8],
        transform: &DesignTransform,
    ) -> Result<Vec<u8>, CompositeError> {
        transform.validate()?;

        let base = image::load_from_memory(base)
            .map_err(|e| CompositeError::ImageLoadFailed(e.to_string()))?;
        let overlay = image::load_from_memory(overlay)
            .map_err(|e| CompositeError::ImageLoadFailed(e.to_string()))?;

        let mut canvas = base
            .resize_exact(CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Triangle)
            .to_rgba8();

        let scaled = scale_overlay(&overlay, transform.scale);
        blend_rotated(&mut canvas, &scaled, transform);

        let mut out = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| CompositeError::UploadFailed(e.to_string()))?;
        Ok(out)
    }
}

/// Resize the overlay so its longer edge is the nominal size times
/// `scale/100`, preserving aspect ratio.
fn scale_overlay(overlay: &DynamicImage, scale: u32) -> RgbaImage {
    let target = (OVERLAY_BASE_PX * scale / 100).max(1);
    overlay.resize(target, target, FilterType::Triangle).to_rgba8()
}

/// Alpha-blend `overlay` onto `canvas`, rotated by the transform's angle
/// about the overlay centre, centred at canvas centre plus the scaled
/// offset.
///
/// Rotation is inverse-mapped with nearest sampling: each canvas pixel in
/// the overlay's bounding area is mapped back into overlay space, so the
/// output never depends on iteration order.
fn blend_rotated(canvas: &mut RgbaImage, overlay: &RgbaImage, transform: &DesignTransform) {
    #[allow(clippy::cast_possible_wrap)]
    let (cx, cy) = (
        (CANVAS_WIDTH as i32) / 2 + transform.x * DISPLAY_UNIT_PX,
        (CANVAS_HEIGHT as i32) / 2 + transform.y * DISPLAY_UNIT_PX,
    );
    let (ow, oh) = (overlay.width(), overlay.height());
    let half_w = f64::from(ow) / 2.0;
    let half_h = f64::from(oh) / 2.0;

    let theta = f64::from(transform.rotation).to_radians();
    let (sin, cos) = theta.sin_cos();

    // The rotated overlay fits inside a circle of this radius around its
    // centre; only canvas pixels inside the bounding square can change.
    #[allow(clippy::cast_possible_truncation)]
    let radius = half_w.hypot(half_h).ceil() as i32;

    for dy in -radius..=radius {
        let py = cy + dy;
        if py < 0 || py >= canvas.height() as i32 {
            continue;
        }
        for dx in -radius..=radius {
            let px = cx + dx;
            if px < 0 || px >= canvas.width() as i32 {
                continue;
            }
            // Inverse rotation: canvas offset back into overlay space.
            let fx = f64::from(dx);
            let fy = f64::from(dy);
            let ox = fx.mul_add(cos, fy * sin) + half_w;
            let oy = (-fx).mul_add(sin, fy * cos) + half_h;
            if ox < 0.0 || oy < 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (ox, oy) = (ox as u32, oy as u32);
            if ox >= ow || oy >= oh {
                continue;
            }
            let src = *overlay.get_pixel(ox, oy);
            #[allow(clippy::cast_sign_loss)]
            let dst = canvas.get_pixel_mut(px as u32, py as u32);
            *dst = blend_pixel(*dst, src);
        }
    }
}

/// Standard source-over alpha blending in integer arithmetic.
fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let alpha = u32::from(src.0[3]);
    if alpha == 0 {
        return dst;
    }
    if alpha == 255 {
        return src;
    }
    let inv = 255 - alpha;
    let mut out = [0_u8; 4];
    for i in 0..3 {
        let blended = (u32::from(src.0[i]) * alpha + u32::from(dst.0[i]) * inv + 127) / 255;
        #[allow(clippy::cast_possible_truncation)]
        {
            out[i] = blended as u8;
        }
    }
    let a = alpha + u32::from(dst.0[3]) * inv / 255;
    #[allow(clippy::cast_possible_truncation)]
    {
        out[3] = a.min(255) as u8;
    }
    Rgba(out)
}

/// Render a flat-colour garment base when no photographic base exists for
/// the selected colour. Deterministic by construction.
#[must_use]
pub fn solid_base(color: &str) -> Vec<u8> {
    let rgba = named_color(color);
    let canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba(rgba));
    let mut out = Vec::new();
    // Encoding a fresh in-memory buffer cannot fail.
    if DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .is_err()
    {
        out.clear();
    }
    out
}

fn named_color(color: &str) -> [u8; 4] {
    match color.to_ascii_lowercase().as_str() {
        "black" => [20, 20, 20, 255],
        "navy" => [22, 33, 62, 255],
        "red" => [178, 34, 52, 255],
        "green" => [34, 102, 68, 255],
        "grey" | "gray" => [128, 128, 128, 255],
        _ => [240, 240, 240, 255],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(image: RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .expect("encode");
        out
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        png_bytes(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn test_compose_is_deterministic() {
        let compositor = Compositor::new();
        let base = solid(400, 500, [20, 20, 20, 255]);
        let overlay = solid(100, 100, [200, 40, 40, 255]);
        let transform =
            DesignTransform::new(120, 45.0, 10, -10).expect("valid transform");

        let first = compositor
            .compose(&base, &overlay, &transform)
            .expect("compose");
        let second = compositor
            .compose(&base, &overlay, &transform)
            .expect("compose");
        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_output_is_canonical_size() {
        let compositor = Compositor::new();
        let base = solid(123, 456, [20, 20, 20, 255]);
        let overlay = solid(64, 64, [255, 255, 255, 255]);
        let out = compositor
            .compose(&base, &overlay, &DesignTransform::identity())
            .expect("compose");

        let decoded = image::load_from_memory(&out).expect("decode");
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[test]
    fn test_overlay_lands_at_offset_centre() {
        let compositor = Compositor::new();
        let base = solid(CANVAS_WIDTH, CANVAS_HEIGHT, [0, 0, 0, 255]);
        let overlay = solid(50, 50, [255, 0, 0, 255]);
        let transform = DesignTransform::new(100, 0.0, 25, 0).expect("valid transform");

        let out = compositor
            .compose(&base, &overlay, &transform)
            .expect("compose");
        let decoded = image::load_from_memory(&out).expect("decode").to_rgba8();

        let cx = (CANVAS_WIDTH as i32 / 2 + 25 * DISPLAY_UNIT_PX) as u32;
        let cy = CANVAS_HEIGHT / 2;
        assert_eq!(decoded.get_pixel(cx, cy).0, [255, 0, 0, 255]);
        // Far corner stays base-coloured.
        assert_eq!(decoded.get_pixel(5, 5).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_corrupt_overlay_rejected() {
        let compositor = Compositor::new();
        let base = solid(100, 100, [0, 0, 0, 255]);
        let err = compositor
            .compose(&base, b"not a png", &DesignTransform::identity())
            .expect_err("must fail");
        assert!(matches!(err, CompositeError::ImageLoadFailed(_)));
    }

    #[test]
    fn test_solid_base_decodes() {
        let bytes = solid_base("navy");
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }
}
