//! Contain-fit transform for a single lightbox page.
//!
//! Maps a media item's intrinsic size and the page viewport to the uniform
//! scale and centering translation used to draw it. Everything here is pure;
//! callers recompute on every query instead of caching across viewport changes.

/// Width/height pair in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// The display area available to one page of the pager.
pub type ViewportGeometry = Size;

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build from integer pixel dimensions as reported by decoders.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// Uniform scale plus centering offsets for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    /// Always > 0.
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for FitTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FitTransform {
    /// Used while dimensions are unknown or unusable.
    pub const IDENTITY: FitTransform = FitTransform {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Largest zoom multiplier for this fit. See [`max_zoom`].
    pub fn max_zoom(&self) -> f64 {
        max_zoom(self.scale)
    }

    /// On-screen size of the media once this transform is applied.
    pub fn displayed_size(&self, intrinsic: Size) -> Size {
        Size::new(intrinsic.width * self.scale, intrinsic.height * self.scale)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Computes the contain fit of `intrinsic` inside `viewport`.
///
/// Unknown, zero, negative or non-finite dimensions on either side yield
/// [`FitTransform::IDENTITY`]; the caller shows a loading placeholder then.
pub fn compute_transform(intrinsic: Option<Size>, viewport: ViewportGeometry) -> FitTransform {
    let Some(intrinsic) = intrinsic.filter(Size::is_positive) else {
        return FitTransform::IDENTITY;
    };
    if !viewport.is_positive() {
        return FitTransform::IDENTITY;
    }

    let scale_w = viewport.width / intrinsic.width;
    let scale_h = viewport.height / intrinsic.height;
    let scale = scale_w.min(scale_h);

    FitTransform {
        scale,
        translate_x: (viewport.width - intrinsic.width * scale) / 2.0,
        translate_y: (viewport.height - intrinsic.height * scale) / 2.0,
    }
}

/// Zoom ceiling for a fit scale: enough to reach native 1:1 pixels, never below 1.
pub fn max_zoom(scale: f64) -> f64 {
    if scale > 0.0 {
        (1.0 / scale).max(1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_unknown_dimensions_are_identity() {
        let viewport = Size::new(390.0, 844.0);
        assert_eq!(compute_transform(None, viewport), FitTransform::IDENTITY);
        assert_eq!(
            compute_transform(Some(Size::new(0.0, 600.0)), viewport),
            FitTransform::IDENTITY
        );
        assert_eq!(
            compute_transform(Some(Size::new(800.0, -1.0)), viewport),
            FitTransform::IDENTITY
        );
        assert_eq!(
            compute_transform(Some(Size::new(f64::NAN, 600.0)), viewport),
            FitTransform::IDENTITY
        );
    }

    #[test]
    fn test_empty_viewport_is_identity() {
        let t = compute_transform(Some(Size::new(800.0, 600.0)), Size::new(0.0, 600.0));
        assert!(t.is_identity());
        assert!(t.scale > 0.0);
    }

    #[test]
    fn test_landscape_in_portrait_viewport() {
        let t = compute_transform(Some(Size::new(1200.0, 600.0)), Size::new(400.0, 800.0));
        assert!((t.scale - 1.0 / 3.0).abs() < EPS);
        assert!(t.translate_x.abs() < 1e-6);
        assert!((t.translate_y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_portrait_in_landscape_viewport() {
        let t = compute_transform(Some(Size::new(1080.0, 1920.0)), Size::new(1920.0, 1080.0));
        let expected = 1080.0 / 1920.0;
        assert!((t.scale - expected).abs() < EPS);
        assert!(t.translate_y.abs() < 1e-6);
        assert!((t.translate_x - (1920.0 - 1080.0 * expected) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_contain_never_overflows() {
        let viewports = [
            Size::new(400.0, 800.0),
            Size::new(1920.0, 1080.0),
            Size::new(1.0, 1.0),
            Size::new(333.3, 777.7),
        ];
        let media = [
            Size::new(1.0, 1.0),
            Size::new(4000.0, 3000.0),
            Size::new(3000.0, 4000.0),
            Size::new(7.0, 9000.0),
            Size::new(12345.0, 3.0),
        ];
        for viewport in viewports {
            for intrinsic in media {
                let t = compute_transform(Some(intrinsic), viewport);
                let shown = t.displayed_size(intrinsic);
                assert!(shown.width <= viewport.width + 1e-6, "{intrinsic:?} in {viewport:?}");
                assert!(shown.height <= viewport.height + 1e-6, "{intrinsic:?} in {viewport:?}");
                assert!(t.translate_x >= -1e-6 && t.translate_y >= -1e-6);
            }
        }
    }

    #[test]
    fn test_growing_viewport_never_shrinks_scale() {
        let intrinsic = Some(Size::new(1600.0, 900.0));
        let mut last = 0.0;
        for w in (100..3000).step_by(97) {
            let t = compute_transform(intrinsic, Size::new(w as f64, 700.0));
            assert!(t.scale >= last);
            last = t.scale;
        }
        let mut last = 0.0;
        for h in (100..3000).step_by(97) {
            let t = compute_transform(intrinsic, Size::new(700.0, h as f64));
            assert!(t.scale >= last);
            last = t.scale;
        }
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let intrinsic = Some(Size::new(3024.0, 4032.0));
        let viewport = Size::new(390.0, 534.0);
        let a = compute_transform(intrinsic, viewport);
        let b = compute_transform(intrinsic, viewport);
        assert_eq!(a.scale.to_bits(), b.scale.to_bits());
        assert_eq!(a.translate_x.to_bits(), b.translate_x.to_bits());
        assert_eq!(a.translate_y.to_bits(), b.translate_y.to_bits());
    }

    #[test]
    fn test_max_zoom_reaches_native_pixels() {
        assert!((max_zoom(0.25) - 4.0).abs() < EPS);
        // Small media already upscaled: zoom never drops below 1.
        assert_eq!(max_zoom(3.0), 1.0);
        assert_eq!(max_zoom(0.0), 1.0);
        assert_eq!(max_zoom(-2.0), 1.0);
        assert_eq!(FitTransform::IDENTITY.max_zoom(), 1.0);
    }
}
