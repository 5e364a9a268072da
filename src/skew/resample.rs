//! Two-pass shear of pixel data.
//!
//! The horizontal shear is applied to the rows of the trim box, the result is
//! transposed so the vertical shear can reuse the same row routine, and the
//! second result is transposed back and cropped to the packed size.

use image::RgbaImage;

use super::bitmap::{Bitmap, PIXEL_SIZE, byte_len};
use super::error::{SkewError, SkewResult};
use super::search::Transform;

/// Full weight of an 8-bit blend
const WEIGHT_ONE: u32 = 255;

/// Placement of one sheared line in its destination row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// First destination pixel written
    pub offset: usize,
    /// Weight of the sample under each output pixel; the preceding sample gets
    /// the rest. `WEIGHT_ONE` is a plain copy.
    pub keep: u32,
}

impl Shift {
    /// Shift line `line` of `lines` for a ramp of `skew`, moved right by `base`
    ///
    /// `base` must be at least `-skew` so the offset is never negative.
    pub fn ramp(skew: i64, line: i64, lines: i64, base: i64) -> Self {
        if lines <= 1 {
            return Self {
                offset: to_index(base),
                keep: WEIGHT_ONE,
            };
        }

        let num = skew * (lines - 1 - line);
        let den = lines - 1;
        let whole = num.div_euclid(den);
        let rem = num.rem_euclid(den);

        // round((1 - frac) * 255) with frac = rem / den
        let keep = if rem == 0 {
            WEIGHT_ONE
        } else {
            let scaled = ((den - rem) * 2 * i64::from(WEIGHT_ONE) + den) / (2 * den);
            u32::try_from(scaled).unwrap_or(WEIGHT_ONE)
        };

        Self {
            offset: to_index(whole + base),
            keep,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.keep == WEIGHT_ONE
    }
}

/// Offsets are non-negative by construction
fn to_index(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Write `src` into `dest` moved right by `shift`
///
/// An exact shift copies the line. Otherwise `len + 1` pixels are written,
/// each channel being `(prev * (255 - keep) + cur * keep) / 255` with samples
/// outside the line read as transparent black.
pub fn shear_pixels(src: &[u8], dest: &mut [u8], shift: Shift) {
    let start = shift.offset * PIXEL_SIZE;

    if shift.is_exact() {
        dest[start..start + src.len()].copy_from_slice(src);
        return;
    }

    let len = src.len() / PIXEL_SIZE;
    let carry = WEIGHT_ONE - shift.keep;
    let sample = |pixel: usize, channel: usize| u32::from(src[pixel * PIXEL_SIZE + channel]);

    for j in 0..=len {
        for c in 0..PIXEL_SIZE {
            let prev = if j > 0 { sample(j - 1, c) } else { 0 };
            let cur = if j < len { sample(j, c) } else { 0 };
            let blended = (prev * carry + cur * shift.keep) / WEIGHT_ONE;
            dest[start + j * PIXEL_SIZE + c] = u8::try_from(blended).unwrap_or(u8::MAX);
        }
    }
}

/// Shear every row of `src` into `dest`, whose rows are `dest_stride` pixels
///
/// `dest_stride` must be at least `src.width() + |skew|`. A single row has no
/// ramp and is copied unchanged at the unshifted position.
pub fn shear_lines(src: &Bitmap<'_>, dest: &mut [u8], dest_stride: usize, skew: i64) {
    let lines = i64::from(src.height());
    let base = (-skew).max(0);

    for (y, dest_row) in (0..src.height()).zip(dest.chunks_exact_mut(dest_stride * PIXEL_SIZE)) {
        let shift = Shift::ramp(skew, i64::from(y), lines, base);
        shear_pixels(src.row(y), dest_row, shift);
    }
}

/// Swap rows and columns of a `width x height` buffer
pub fn transpose(src: &[u8], width: usize, height: usize) -> SkewResult<Vec<u8>> {
    let mut dest = zeroed(src.len())?;

    for (y, row) in src.chunks_exact(width * PIXEL_SIZE).take(height).enumerate() {
        for (x, pixel) in row.chunks_exact(PIXEL_SIZE).enumerate() {
            let at = (x * height + y) * PIXEL_SIZE;
            dest[at..at + PIXEL_SIZE].copy_from_slice(pixel);
        }
    }

    Ok(dest)
}

/// Zero-filled scratch buffer
fn zeroed(len: usize) -> SkewResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_e| SkewError::AllocationFailed(len))?;
    buf.resize(len, 0);
    Ok(buf)
}

fn dim(value: i64, transform: &Transform) -> SkewResult<u32> {
    u32::try_from(value).map_err(|_e| SkewError::DimensionOverflow {
        width: u32::try_from(transform.bounding_w).unwrap_or(u32::MAX),
        height: u32::try_from(transform.bounding_h).unwrap_or(u32::MAX),
    })
}

/// Resample the trim box of `bitmap` into the packed `minw x minh` image
pub fn resample(bitmap: &Bitmap<'_>, transform: &Transform) -> SkewResult<RgbaImage> {
    if transform.is_empty() {
        return Ok(RgbaImage::new(0, 0));
    }

    let t = transform;
    let bounding_w = dim(t.bounding_w, t)?;
    let bounding_h = dim(t.bounding_h, t)?;
    let minw = dim(t.minw, t)?;
    let minh = dim(t.minh, t)?;
    let source = bitmap.view(dim(t.bounding_x, t)?, dim(t.bounding_y, t)?, bounding_w, bounding_h);

    // Horizontal shear of the trim box rows
    let width1 = dim(t.bounding_w + t.skew_x.abs(), t)?;
    let mut sheared = zeroed(byte_len(width1, bounding_h)?)?;
    shear_lines(&source, &mut sheared, width1 as usize, t.skew_x);
    let columns = transpose(&sheared, width1 as usize, bounding_h as usize)?;
    drop(sheared);

    // Vertical shear of the `minw` columns holding content
    let first_column = dim(t.skew_offx + (-t.skew_x).max(0), t)?;
    let columns = Bitmap::new(bounding_h, width1, &columns)?.view(0, first_column, bounding_h, minw);
    let width2 = dim(t.bounding_h + t.skew_y.abs(), t)?;
    let mut sheared = zeroed(byte_len(width2, minw)?)?;
    shear_lines(&columns, &mut sheared, width2 as usize, t.skew_y);
    let rows = transpose(&sheared, width2 as usize, minw as usize)?;
    drop(sheared);

    // Crop the `minh` rows holding content
    let first_row = dim(t.skew_offy + (-t.skew_y).max(0), t)? as usize;
    let row_bytes = minw as usize * PIXEL_SIZE;
    let content = rows[first_row * row_bytes..(first_row + minh as usize) * row_bytes].to_vec();

    let expected = content.len();
    RgbaImage::from_raw(minw, minh, content).ok_or(SkewError::InvalidBufferSize {
        width: minw,
        height: minh,
        expected,
        actual: expected,
    })
}
