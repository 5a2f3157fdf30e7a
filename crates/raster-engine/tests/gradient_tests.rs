//! End-to-end renders of the reference gradient.

use raster_engine::{Bounds, Engine, Gradient, RgbaBuffer};
use test_utils::{assert_written_once, gradient, CountingSink, GRADIENT_4X4, GRADIENT_SIDE};

#[test]
fn test_4x4_gradient_matches_reference() {
    let sink = CountingSink::new(GRADIENT_SIDE, GRADIENT_SIDE);
    let source = Gradient::new(GRADIENT_SIDE, GRADIENT_SIDE);

    let stats = Engine::new(&source, &sink)
        .unwrap()
        .with_workers(2)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(stats.pixels, 16);
    assert_written_once!(sink);
    assert_eq!(sink.get(0, 0), Some(gradient::TOP_LEFT));
    assert_eq!(sink.get(3, 3), Some(gradient::BOTTOM_RIGHT));

    for (y, row) in GRADIENT_4X4.iter().enumerate() {
        for (x, expected) in row.iter().enumerate() {
            assert_eq!(sink.get(x as i32, y as i32), Some(*expected), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_gradient_into_offset_buffer() {
    let bounds = Bounds::new(10, -2, 14, 2);
    let buffer = RgbaBuffer::with_bounds(bounds);
    let source = Gradient::for_bounds(bounds);

    Engine::new(&source, &buffer).unwrap().run().unwrap();

    assert_eq!(buffer.get(10, -2), Some(gradient::TOP_LEFT));
    assert_eq!(buffer.get(13, 1), Some(gradient::BOTTOM_RIGHT));
    assert_eq!(buffer.row(2).unwrap(), GRADIENT_4X4[2].to_vec());
}

#[test]
fn test_gradient_channels_are_monotonic() {
    let buffer = RgbaBuffer::new(64, 32);
    let source = Gradient::new(64, 32);
    Engine::new(&source, &buffer).unwrap().run().unwrap();

    let top = buffer.row(0).unwrap();
    assert!(top.windows(2).all(|w| w[0].r <= w[1].r && w[0].b >= w[1].b));
    assert!(top.iter().all(|c| c.a == 255 && u16::from(c.r) + u16::from(c.b) == 255));

    let first_column: Vec<u8> = (0..32).map(|y| buffer.get(0, y).unwrap().g).collect();
    assert!(first_column.windows(2).all(|w| w[0] <= w[1]));
}
