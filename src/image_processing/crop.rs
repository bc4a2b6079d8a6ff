/// Side length of every output image in pixels.
pub const OUTPUT_SIZE: u32 = 512;

/// Aspect ratio (width / height) of the crop window. The pipeline only
/// produces square samples; kept as a named constant so the crop math can be
/// tested against it rather than a literal.
pub const TARGET_RATIO: f64 = 1.0;

/// Crop direction, derived from the decoded image dimensions.
///
/// Square images count as horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Taller than wide: crops slide along the vertical axis
    Vertical,
    /// Wider than tall (or square): crops slide along the horizontal axis
    Horizontal,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }
}

/// Which of the three canonical crops to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Center crop only (one output per image)
    CenterOnly,
    /// Start and end crops only (two outputs per image)
    Edges,
    /// Start, center and end crops (three outputs per image)
    All,
}

/// A rectangular sub-region of the source image plus the filename suffix
/// identifying its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub suffix: &'static str,
}

/// Compute the crop regions for an image of the given dimensions.
///
/// Vertical images produce full-width windows tagged `_S`/`_C`/`_E` (start,
/// center, end); horizontal images produce full-height windows tagged
/// `_L`/`_C`/`_R`. Offsets use integer division, so the center window is
/// biased towards the top/left on odd remainders. The mode filters the three
/// candidates down to the requested subset, preserving order.
///
/// When the window spans the whole image (square input) the three regions
/// are identical in content but are still returned as distinct entries.
pub fn plan_crops(width: u32, height: u32, mode: CropMode) -> Vec<CropRegion> {
    let candidates = match Orientation::from_dimensions(width, height) {
        Orientation::Vertical => {
            let crop_height = ((width as f64 / TARGET_RATIO) as u32).min(height);
            let span = |y: u32, suffix| CropRegion {
                x: 0,
                y,
                width,
                height: crop_height,
                suffix,
            };
            [
                span(0, "_S"),
                span((height - crop_height) / 2, "_C"),
                span(height - crop_height, "_E"),
            ]
        }
        Orientation::Horizontal => {
            let crop_width = ((height as f64 * TARGET_RATIO) as u32).min(width);
            let span = |x: u32, suffix| CropRegion {
                x,
                y: 0,
                width: crop_width,
                height,
                suffix,
            };
            [
                span(0, "_L"),
                span((width - crop_width) / 2, "_C"),
                span(width - crop_width, "_R"),
            ]
        }
    };

    match mode {
        CropMode::CenterOnly => vec![candidates[1]],
        CropMode::Edges => vec![candidates[0], candidates[2]],
        CropMode::All => candidates.to_vec(),
    }
}
