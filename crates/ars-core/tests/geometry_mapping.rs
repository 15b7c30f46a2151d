//! Integration tests for display geometry.
//!
//! These tests drive the public `GeometryPipeline` API with real frames and
//! check that input mapping stays consistent with what is on screen.

use ars_core::{
    protocol::framebuffer::{decode_framebuffer, encode_framebuffer, PixelLayout},
    DisplayGeometry, GeometryPipeline, MirrorConfig, Orientation, RawFrame,
};

fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
    assert!(
        (actual.0 - expected.0).abs() < 1e-6 && (actual.1 - expected.1).abs() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}

fn blank_frame(width: u32, height: u32) -> RawFrame {
    RawFrame::new(width, height, vec![0; (width * height * 4) as usize]).unwrap()
}

#[test]
fn test_default_config_gives_half_scale_and_maps_tap() {
    // Arrange
    let config = MirrorConfig::default();
    let (sw, sh) = config.surface_size();
    let mut pipeline = GeometryPipeline::new(sw, sh);

    // Act
    let geometry = pipeline.configure_native(config.width, config.height);

    // Assert
    assert!((geometry.scale - 0.5).abs() < 1e-9);
    assert_close(pipeline.to_device_coords(100.0, 50.0).unwrap(), (200.0, 100.0));
}

#[test]
fn test_rotated_tap_maps_to_rotation_adjusted_point() {
    // Arrange
    let mut pipeline = GeometryPipeline::new(240, 400);
    pipeline.configure_native(480, 800);

    // Act
    pipeline.toggle_orientation();
    let device = pipeline.to_device_coords(100.0, 50.0).unwrap();

    // Assert: oriented view is 800x480 at scale 0.3.
    // (100, 50) / 0.3 = (333.3, 166.7); rotate back: (v, 800 - u).
    assert_close(device, (50.0 / 0.3, 800.0 - 100.0 / 0.3));
}

#[test]
fn test_round_trip_inside_bounds_for_both_orientations() {
    for orientation in [Orientation::Normal, Orientation::Rotated90] {
        let geometry = DisplayGeometry::compute(480, 800, orientation, (240, 400), None);
        let (w, h) = geometry.target_rect();

        for i in 0..=20 {
            for j in 0..=20 {
                let p = (w as f64 * i as f64 / 20.0, h as f64 * j as f64 / 20.0);
                assert!(geometry.contains_display_point(p.0, p.1));

                let device = geometry.to_device_coords(p.0, p.1);
                let back = geometry.to_display_coords(device.0, device.1);

                assert_close(back, p);
            }
        }
    }
}

#[test]
fn test_displayed_frame_and_input_mapping_agree() {
    // Arrange: a 2x3 device frame with one lit pixel at device (1, 0).
    let mut pixels = vec![0u8; 2 * 3 * 4];
    pixels[4..8].copy_from_slice(&[255, 255, 255, 255]);
    let bytes = encode_framebuffer(2, 3, PixelLayout::Rgba8888, &pixels);
    let frame = decode_framebuffer(&bytes).unwrap();
    let mut pipeline = GeometryPipeline::new(100, 100).with_orientation(Orientation::Rotated90);

    // Act
    let geometry = pipeline.update_from_frame(&frame);
    let shown = pipeline.to_display_rotation(frame);

    // Assert: the lit pixel is where the inverse mapping says device (1, 0) is.
    let (dx, dy) = geometry.to_display_coords(1.5, 0.5);
    let (px, py) = ((dx / geometry.scale) as u32, (dy / geometry.scale) as u32);
    assert_eq!(shown.pixel(px, py), Some([255, 255, 255, 255]));
}

#[test]
fn test_same_size_frames_keep_geometry_stable() {
    let mut pipeline = GeometryPipeline::new(240, 400);

    let first = pipeline.update_from_frame(&blank_frame(48, 80));
    let second = pipeline.update_from_frame(&blank_frame(48, 80));

    assert_eq!(first, second);
    assert!((first.scale - 1.0).abs() < 1e-9, "small devices are never upscaled");
}
