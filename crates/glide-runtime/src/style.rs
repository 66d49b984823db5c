#![forbid(unsafe_code)]

//! Render-ready style values for the three overlay layers.
//!
//! The background is a circle of `origin_diameter` centred on the anchor
//! (usually the button that opened the overlay); it is scaled up until it
//! covers the viewport. The container and content layers only fade.

use glide_core::geometry::{Point, Size};
use glide_core::validation::{ConfigError, ConfigResult};

use crate::channel::ComposedOutputs;

/// Viewport and anchor for one overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    viewport: Size,
    anchor: Point,
}

impl OverlayLayout {
    /// Create a layout. Non-finite anchors are replaced by the viewport centre.
    pub fn new(viewport: Size, anchor: Point) -> ConfigResult<Self> {
        if viewport.is_empty() {
            return Err(ConfigError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let anchor = if anchor.is_finite() {
            anchor
        } else {
            Point::new(viewport.width / 2.0, viewport.height / 2.0)
        };
        Ok(Self { viewport, anchor })
    }

    /// Layout anchored at the centre of the viewport.
    pub fn centered(viewport: Size) -> ConfigResult<Self> {
        Self::new(viewport, Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Anchor point.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Scale at which a circle of `diameter` covers the viewport from any anchor.
    pub fn max_scale(&self, diameter: f32) -> f32 {
        2.0 * self.viewport.max_extent() / diameter
    }
}

/// Style of the expanding background circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStyle<C> {
    /// Left edge of the unscaled circle.
    pub left: f32,
    /// Top edge of the unscaled circle.
    pub top: f32,
    /// Unscaled width.
    pub width: f32,
    /// Unscaled height.
    pub height: f32,
    /// Corner radius (half the diameter).
    pub border_radius: f32,
    /// Scale around the circle's centre.
    pub scale: f32,
    /// Opacity in [0, 1].
    pub opacity: f32,
    /// Host-supplied fill.
    pub color: C,
}

impl<C> BackgroundStyle<C> {
    /// Build the background style from composed channel outputs.
    pub fn compose(
        layout: &OverlayLayout,
        diameter: f32,
        outputs: &ComposedOutputs,
        color: C,
    ) -> Self {
        let radius = diameter / 2.0;
        Self {
            left: layout.anchor.x - radius,
            top: layout.anchor.y - radius,
            width: diameter,
            height: diameter,
            border_radius: radius,
            scale: outputs.scale,
            opacity: outputs.opacity,
            color,
        }
    }
}

/// Style of the overlay container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerStyle {
    /// Opacity in [0, 1].
    pub opacity: f32,
}

/// Style of the overlay content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentStyle {
    /// Opacity in [0, 1].
    pub opacity: f32,
}
