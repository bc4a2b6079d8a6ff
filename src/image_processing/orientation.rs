use exif::{In, Reader, Tag, Value};
use image::{imageops, RgbImage};
use std::io::Cursor;

/// EXIF orientation values, per the EXIF specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifOrientation {
    /// No orientation specified or undefined
    Undefined = 0,
    /// Normal orientation (0 degrees)
    TopLeft = 1,
    /// Horizontally flipped
    TopRight = 2,
    /// Rotated 180 degrees
    BottomRight = 3,
    /// Vertically flipped
    BottomLeft = 4,
    /// Rotated 90 degrees CCW + horizontally flipped
    LeftTop = 5,
    /// Rotated 90 degrees CW (portrait)
    RightTop = 6,
    /// Rotated 90 degrees CW + horizontally flipped
    RightBottom = 7,
    /// Rotated 90 degrees CCW (portrait)
    LeftBottom = 8,
}

impl From<u32> for ExifOrientation {
    fn from(value: u32) -> Self {
        match value {
            1 => ExifOrientation::TopLeft,
            2 => ExifOrientation::TopRight,
            3 => ExifOrientation::BottomRight,
            4 => ExifOrientation::BottomLeft,
            5 => ExifOrientation::LeftTop,
            6 => ExifOrientation::RightTop,
            7 => ExifOrientation::RightBottom,
            8 => ExifOrientation::LeftBottom,
            _ => ExifOrientation::Undefined,
        }
    }
}

/// Read the EXIF orientation tag from raw, still-encoded image bytes.
///
/// PNG files and JPEGs without EXIF simply report `Undefined`; malformed
/// EXIF segments are treated the same way rather than failing the image.
pub fn read_orientation(bytes: &[u8]) -> ExifOrientation {
    let mut reader = Cursor::new(bytes);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(_) => return ExifOrientation::Undefined,
    };

    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(values) = &field.value {
            if let Some(&value) = values.first() {
                return ExifOrientation::from(u32::from(value));
            }
        }
    }

    ExifOrientation::Undefined
}

/// Apply an EXIF rotation to a decoded image.
///
/// Handles all 8 orientations with the matching combination of rotations and
/// flips; `Undefined`/`TopLeft` return the buffer unchanged.
pub fn apply_rotation(img: RgbImage, orientation: ExifOrientation) -> RgbImage {
    match orientation {
        ExifOrientation::Undefined | ExifOrientation::TopLeft => img,
        ExifOrientation::TopRight => imageops::flip_horizontal(&img),
        ExifOrientation::BottomRight => imageops::rotate180(&img),
        ExifOrientation::BottomLeft => imageops::flip_vertical(&img),
        ExifOrientation::LeftTop => imageops::flip_horizontal(&imageops::rotate270(&img)),
        ExifOrientation::RightTop => imageops::rotate90(&img),
        ExifOrientation::RightBottom => imageops::flip_horizontal(&imageops::rotate90(&img)),
        ExifOrientation::LeftBottom => imageops::rotate270(&img),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        })
    }

    #[test]
    fn test_exif_orientation_from_u32() {
        assert_eq!(ExifOrientation::from(1), ExifOrientation::TopLeft);
        assert_eq!(ExifOrientation::from(6), ExifOrientation::RightTop);
        assert_eq!(ExifOrientation::from(8), ExifOrientation::LeftBottom);
        assert_eq!(ExifOrientation::from(99), ExifOrientation::Undefined);
    }

    #[test]
    fn test_read_orientation_non_exif_bytes() {
        assert_eq!(read_orientation(b"not an image"), ExifOrientation::Undefined);
        assert_eq!(read_orientation(&[]), ExifOrientation::Undefined);
    }

    #[test]
    fn test_apply_rotation_identity() {
        let img = gradient_image(4, 6);
        let rotated = apply_rotation(img.clone(), ExifOrientation::TopLeft);
        assert_eq!(rotated, img);
    }

    #[test]
    fn test_apply_rotation_swaps_dimensions() {
        let img = gradient_image(4, 6);

        let cw = apply_rotation(img.clone(), ExifOrientation::RightTop);
        assert_eq!(cw.dimensions(), (6, 4));

        let ccw = apply_rotation(img, ExifOrientation::LeftBottom);
        assert_eq!(ccw.dimensions(), (6, 4));
    }

    #[test]
    fn test_apply_rotation_180_round_trips() {
        let img = gradient_image(5, 3);
        let twice = apply_rotation(
            apply_rotation(img.clone(), ExifOrientation::BottomRight),
            ExifOrientation::BottomRight,
        );
        assert_eq!(twice, img);
    }
}
