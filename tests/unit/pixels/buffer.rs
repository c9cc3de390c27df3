use super::*;
use crate::codec::encode;
use crate::foundation::core::Vec3;

#[test]
fn fresh_buffer_is_all_background() {
    let buf = PixelBuffer::with_default_background(16).unwrap();
    assert_eq!(buf.len(), 256);
    assert!(buf.texels().iter().all(|px| *px == BACKGROUND_RGBA));
    assert!(
        buf.to_rgba8()
            .chunks_exact(4)
            .all(|px| px == [0, 0, 0, 168])
    );
}

#[test]
fn zero_size_is_rejected() {
    assert!(PixelBuffer::new(0, BACKGROUND_RGBA).is_err());
}

#[test]
fn write_touches_exactly_one_texel() {
    let mut buf = PixelBuffer::with_default_background(8).unwrap();
    let color = encode(Vec3::new(0.5, 0.25, 0.0), Vec3::ZERO).unwrap();
    let addr = TexelAddress { column: 5, row: 2 };
    buf.write(addr, color).unwrap();

    assert_eq!(buf.get(addr).unwrap(), color.to_rgba());
    let changed = buf
        .texels()
        .iter()
        .filter(|px| **px != BACKGROUND_RGBA)
        .count();
    assert_eq!(changed, 1);
    assert_eq!(buf.len(), 64);
}

#[test]
fn out_of_grid_write_is_rejected() {
    let mut buf = PixelBuffer::with_default_background(4).unwrap();
    let err = buf
        .write_rgba(TexelAddress { column: 4, row: 0 }, [1.0; 4])
        .unwrap_err();
    assert!(err.to_string().contains("outside the 4x4 texture"));
}

#[test]
fn flatten_is_row_major_channel_interleaved() {
    let mut buf = PixelBuffer::new(2, [0.0; 4]).unwrap();
    buf.write_rgba(TexelAddress { column: 1, row: 0 }, [0.1, 0.2, 0.3, 0.4])
        .unwrap();
    buf.write_rgba(TexelAddress { column: 0, row: 1 }, [0.5, 0.6, 0.7, 0.8])
        .unwrap();

    let flat = buf.flatten();
    assert_eq!(flat.len(), 2 * 2 * 4);
    assert_eq!(&flat[4..8], &[0.1, 0.2, 0.3, 0.4]);
    assert_eq!(&flat[8..12], &[0.5, 0.6, 0.7, 0.8]);
}

#[test]
fn top_down_flips_rows() {
    let mut buf = PixelBuffer::new(2, [0.0, 0.0, 0.0, 1.0]).unwrap();
    buf.write_rgba(TexelAddress { column: 0, row: 0 }, [1.0, 0.0, 0.0, 1.0])
        .unwrap();

    let bottom_first = buf.to_rgba8();
    let top_first = buf.to_rgba8_top_down();
    assert_eq!(&bottom_first[0..4], &[255, 0, 0, 255]);
    assert_eq!(&top_first[8..12], &[255, 0, 0, 255]);
    assert_eq!(&top_first[0..4], &[0, 0, 0, 255]);
}

#[test]
fn overflowed_alpha_clamps_on_export() {
    let mut buf = PixelBuffer::with_default_background(2).unwrap();
    let color = encode(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO).unwrap();
    buf.write(TexelAddress { column: 0, row: 0 }, color).unwrap();
    assert_eq!(buf.to_rgba8()[3], color.to_rgba8()[3]);
}
