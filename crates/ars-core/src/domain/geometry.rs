//! Display geometry: how device pixels map onto the viewer surface.
//!
//! # Coordinate spaces (for beginners)
//!
//! There are two coordinate spaces in play:
//!
//! - **Device space** – the phone's own framebuffer, e.g. 480×800 for a
//!   portrait handset.  Shell commands such as `input tap` expect these.
//! - **Display space** – pixels on the viewer surface.  The frame is first
//!   optionally rotated 90° clockwise (landscape viewing), then scaled by a
//!   single uniform factor.
//!
//! ```text
//!   device (x, y) ──rotate?──► oriented (u, v) ──× scale──► display
//!   display ──÷ scale──► oriented (u, v) ──rotate⁻¹?──► device (x, y)
//! ```
//!
//! With a clockwise rotation the oriented point of device `(x, y)` is
//! `(native_height - y, x)`.  The inverse is `(v, native_height - u)`.
//!
//! The scale factor never exceeds 1 when fitting to a surface: the mirrored
//! image shrinks to fit but is never blown up.  A user-forced scale bypasses
//! that clamp and the surface is expected to resize around it.

use crate::domain::frame::RawFrame;

/// Whether the frame is shown as captured or rotated a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    /// Rotated 90° clockwise (landscape viewing of a portrait device).
    Rotated90,
}

impl Orientation {
    /// Returns the other orientation.
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Normal => Orientation::Rotated90,
            Orientation::Rotated90 => Orientation::Normal,
        }
    }
}

/// A resolved mapping between device pixels and display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub native_width: u32,
    pub native_height: u32,
    pub orientation: Orientation,
    /// Display pixels per device pixel.
    pub scale: f64,
    pub display_width: u32,
    pub display_height: u32,
}

impl DisplayGeometry {
    /// Resolves the geometry for a device of `native_width × native_height`.
    ///
    /// With `user_scale = None` the scale is
    /// `min(1, surface_w / oriented_w, surface_h / oriented_h)`.  A positive
    /// `user_scale` is used as-is.
    pub fn compute(
        native_width: u32,
        native_height: u32,
        orientation: Orientation,
        surface: (u32, u32),
        user_scale: Option<f64>,
    ) -> Self {
        let (ow, oh) = oriented_size(native_width, native_height, orientation);
        let scale = match user_scale {
            Some(s) if s.is_finite() && s > 0.0 => s,
            _ => fit_scale(ow, oh, surface),
        };
        Self {
            native_width,
            native_height,
            orientation,
            scale,
            display_width: scaled(ow, scale),
            display_height: scaled(oh, scale),
        }
    }

    /// Size of the frame after rotation, before scaling.
    pub fn oriented_size(&self) -> (u32, u32) {
        oriented_size(self.native_width, self.native_height, self.orientation)
    }

    /// The target rectangle the surface blits the frame into.
    pub fn target_rect(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    /// Maps a device-space point to display space.
    pub fn to_display_coords(&self, device_x: f64, device_y: f64) -> (f64, f64) {
        let (u, v) = match self.orientation {
            Orientation::Normal => (device_x, device_y),
            Orientation::Rotated90 => (self.native_height as f64 - device_y, device_x),
        };
        (u * self.scale, v * self.scale)
    }

    /// Maps a display-space point back to device space.
    pub fn to_device_coords(&self, display_x: f64, display_y: f64) -> (f64, f64) {
        let (u, v) = (display_x / self.scale, display_y / self.scale);
        match self.orientation {
            Orientation::Normal => (u, v),
            Orientation::Rotated90 => (v, self.native_height as f64 - u),
        }
    }

    /// Returns `true` if the display point lies on the mirrored image.
    pub fn contains_display_point(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.display_width as f64 && y <= self.display_height as f64
    }
}

fn oriented_size(width: u32, height: u32, orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Normal => (width, height),
        Orientation::Rotated90 => (height, width),
    }
}

fn fit_scale(width: u32, height: u32, (surface_w, surface_h): (u32, u32)) -> f64 {
    if width == 0 || height == 0 || surface_w == 0 || surface_h == 0 {
        return 1.0;
    }
    let sx = surface_w as f64 / width as f64;
    let sy = surface_h as f64 / height as f64;
    1.0_f64.min(sx).min(sy)
}

fn scaled(len: u32, scale: f64) -> u32 {
    ((len as f64 * scale).round() as u32).max(1)
}

/// Owns the orientation and scale state of one mirroring session and keeps
/// the current [`DisplayGeometry`] in sync with it.
#[derive(Debug, Clone)]
pub struct GeometryPipeline {
    surface: (u32, u32),
    user_scale: Option<f64>,
    orientation: Orientation,
    native: Option<(u32, u32)>,
    current: Option<DisplayGeometry>,
}

impl GeometryPipeline {
    /// Creates a pipeline that fits frames into a `surface_width ×
    /// surface_height` area.  No geometry exists until native dimensions are
    /// observed.
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self {
            surface: (surface_width, surface_height),
            user_scale: None,
            orientation: Orientation::Normal,
            native: None,
            current: None,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_user_scale(mut self, scale: Option<f64>) -> Self {
        self.user_scale = scale;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// The geometry currently in effect, if a frame size has been observed.
    pub fn geometry(&self) -> Option<DisplayGeometry> {
        self.current
    }

    /// Declares the native device size without waiting for a frame.
    pub fn configure_native(&mut self, width: u32, height: u32) -> DisplayGeometry {
        self.native = Some((width, height));
        self.recompute(width, height)
    }

    /// Feeds a captured frame through the pipeline, recomputing the
    /// geometry on the first frame or whenever the native size changes.
    pub fn update_from_frame(&mut self, frame: &RawFrame) -> DisplayGeometry {
        let dims = (frame.width(), frame.height());
        match self.current {
            Some(geometry) if self.native == Some(dims) => geometry,
            _ => self.configure_native(dims.0, dims.1),
        }
    }

    /// Applies the rotation step to a frame.  Scaling is left to the surface,
    /// which blits into [`DisplayGeometry::target_rect`].
    pub fn to_display_rotation(&self, frame: RawFrame) -> RawFrame {
        match self.orientation {
            Orientation::Normal => frame,
            Orientation::Rotated90 => frame.rotated_clockwise(),
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.refresh();
        }
    }

    /// Flips between portrait and landscape viewing.
    pub fn toggle_orientation(&mut self) -> Orientation {
        self.set_orientation(self.orientation.toggled());
        self.orientation
    }

    /// Forces a scale (`Some`) or returns to fit-to-surface (`None`).
    pub fn set_user_scale(&mut self, scale: Option<f64>) {
        self.user_scale = scale;
        self.refresh();
    }

    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface = (width, height);
        self.refresh();
    }

    /// Maps a display-space point to device space with the current geometry.
    pub fn to_device_coords(&self, display_x: f64, display_y: f64) -> Option<(f64, f64)> {
        self.current
            .map(|g| g.to_device_coords(display_x, display_y))
    }

    /// Maps a device-space point to display space with the current geometry.
    pub fn to_display_coords(&self, device_x: f64, device_y: f64) -> Option<(f64, f64)> {
        self.current
            .map(|g| g.to_display_coords(device_x, device_y))
    }

    fn refresh(&mut self) {
        if let Some((w, h)) = self.native {
            self.recompute(w, h);
        }
    }

    fn recompute(&mut self, width: u32, height: u32) -> DisplayGeometry {
        let geometry =
            DisplayGeometry::compute(width, height, self.orientation, self.surface, self.user_scale);
        tracing::debug!(
            native_width = width,
            native_height = height,
            orientation = ?self.orientation,
            scale = geometry.scale,
            "display geometry recomputed"
        );
        self.current = Some(geometry);
        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-6 && (actual.1 - expected.1).abs() < 1e-6,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        let g = DisplayGeometry::compute(480, 800, Orientation::Normal, (240, 600), None);

        assert!((g.scale - 0.5).abs() < EPS);
        assert_eq!(g.target_rect(), (240, 400));
    }

    #[test]
    fn test_fit_scale_never_exceeds_one() {
        let g = DisplayGeometry::compute(480, 800, Orientation::Normal, (1920, 1080), None);

        assert!((g.scale - 1.0).abs() < EPS);
        assert_eq!(g.target_rect(), (480, 800));
    }

    #[test]
    fn test_user_scale_bypasses_clamp() {
        let g = DisplayGeometry::compute(480, 800, Orientation::Normal, (100, 100), Some(1.5));

        assert!((g.scale - 1.5).abs() < EPS);
        assert_eq!(g.target_rect(), (720, 1200));
    }

    #[test]
    fn test_non_positive_user_scale_falls_back_to_fit() {
        let g = DisplayGeometry::compute(480, 800, Orientation::Normal, (240, 400), Some(0.0));

        assert!((g.scale - 0.5).abs() < EPS);
    }

    #[test]
    fn test_rotated_geometry_swaps_oriented_size() {
        let g = DisplayGeometry::compute(480, 800, Orientation::Rotated90, (800, 480), None);

        assert_eq!(g.oriented_size(), (800, 480));
        assert_eq!(g.target_rect(), (800, 480));
    }

    #[test]
    fn test_rotated_mapping_of_device_origin() {
        // Device top-left lands at the top-right of a clockwise-rotated view.
        let g = DisplayGeometry::compute(480, 800, Orientation::Rotated90, (800, 480), None);

        assert_close(g.to_display_coords(0.0, 0.0), (800.0, 0.0));
        assert_close(g.to_device_coords(800.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_pipeline_has_no_geometry_before_first_frame() {
        let pipeline = GeometryPipeline::new(240, 400);

        assert!(pipeline.geometry().is_none());
        assert!(pipeline.to_device_coords(10.0, 10.0).is_none());
    }

    #[test]
    fn test_update_from_frame_recomputes_on_size_change() {
        let mut pipeline = GeometryPipeline::new(240, 400);
        let small = RawFrame::new(480, 800, vec![0; 480 * 800 * 4]).unwrap();
        let large = RawFrame::new(960, 1600, vec![0; 960 * 1600 * 4]).unwrap();

        let first = pipeline.update_from_frame(&small);
        let second = pipeline.update_from_frame(&large);

        assert!((first.scale - 0.5).abs() < EPS);
        assert!((second.scale - 0.25).abs() < EPS);
    }

    #[test]
    fn test_toggle_orientation_recomputes_geometry() {
        let mut pipeline = GeometryPipeline::new(240, 400);
        pipeline.configure_native(480, 800);

        let orientation = pipeline.toggle_orientation();

        assert_eq!(orientation, Orientation::Rotated90);
        let g = pipeline.geometry().unwrap();
        assert_eq!(g.orientation, Orientation::Rotated90);
        assert!((g.scale - 0.3).abs() < EPS);
    }

    #[test]
    fn test_set_user_scale_recomputes_geometry() {
        let mut pipeline = GeometryPipeline::new(240, 400);
        pipeline.configure_native(480, 800);

        pipeline.set_user_scale(Some(0.75));

        assert!((pipeline.geometry().unwrap().scale - 0.75).abs() < EPS);
    }

    #[test]
    fn test_to_display_rotation_only_rotates_when_flagged() {
        let frame = RawFrame::new(2, 1, vec![1, 1, 1, 1, 2, 2, 2, 2]).unwrap();
        let normal = GeometryPipeline::new(10, 10);
        let rotated = GeometryPipeline::new(10, 10).with_orientation(Orientation::Rotated90);

        let same = normal.to_display_rotation(frame.clone());
        let turned = rotated.to_display_rotation(frame);

        assert_eq!((same.width(), same.height()), (2, 1));
        assert_eq!((turned.width(), turned.height()), (1, 2));
    }
}
