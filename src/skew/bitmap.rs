use image::RgbaImage;

use super::error::{SkewError, SkewResult};

/// Bytes per RGBA8 pixel
pub const PIXEL_SIZE: usize = 4;

/// Borrowed view of an RGBA8 raster
///
/// Rows are `stride` pixels apart, so a view can address a sub-rectangle of a
/// larger image without copying.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: u32,
}

impl<'a> Bitmap<'a> {
    /// Wrap a tightly packed buffer. Its length must be exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> SkewResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(SkewError::InvalidBufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            stride: width,
        })
    }

    /// Wrap a buffer whose rows are `stride` pixels apart
    pub fn with_stride(width: u32, height: u32, stride: u32, data: &'a [u8]) -> SkewResult<Self> {
        if stride < width {
            return Err(SkewError::InvalidStride { width, stride });
        }

        let expected = if width == 0 || height == 0 {
            0
        } else {
            // Last row only needs `width` pixels
            byte_len(stride, height - 1)? + byte_len(width, 1)?
        };
        if data.len() < expected {
            return Err(SkewError::InvalidBufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn from_image(image: &'a RgbaImage) -> Self {
        Self {
            data: image.as_raw(),
            width: image.width(),
            height: image.height(),
            stride: image.width(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in pixels
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Pixels of row `y`, `width * 4` bytes
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride as usize * PIXEL_SIZE;
        &self.data[start..start + self.width as usize * PIXEL_SIZE]
    }

    /// Sub-rectangle starting at `(x, y)`, clamped to the bitmap bounds
    pub fn view(&self, x: u32, y: u32, width: u32, height: u32) -> Bitmap<'a> {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);

        let start = (y as usize * self.stride as usize + x as usize) * PIXEL_SIZE;
        let data = if width == 0 || height == 0 {
            &self.data[..0]
        } else {
            &self.data[start..]
        };

        Bitmap {
            data,
            width,
            height,
            stride: self.stride,
        }
    }
}

/// Size in bytes of a `width x height` RGBA8 buffer
pub(crate) fn byte_len(width: u32, height: u32) -> SkewResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(PIXEL_SIZE))
        .ok_or(SkewError::DimensionOverflow { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let data = vec![0u8; 15];
        let err = Bitmap::new(2, 2, &data).unwrap_err();
        assert_eq!(
            err,
            SkewError::InvalidBufferSize {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15,
            }
        );
    }

    #[test]
    fn test_with_stride_rejects_narrow_stride() {
        let data = vec![0u8; 64];
        assert!(matches!(
            Bitmap::with_stride(4, 2, 3, &data),
            Err(SkewError::InvalidStride { .. })
        ));
    }

    #[test]
    fn test_view_rows() {
        // 3x2 image, each pixel's red channel holds its index
        let data: Vec<u8> = (0..6u8).flat_map(|i| [i, 0, 0, 255]).collect();
        let bitmap = Bitmap::new(3, 2, &data).unwrap();

        let view = bitmap.view(1, 1, 2, 1);
        assert_eq!(view.width(), 2);
        assert_eq!(view.height(), 1);
        assert_eq!(view.stride(), 3);
        assert_eq!(view.row(0), &[4, 0, 0, 255, 5, 0, 0, 255]);
    }

    #[test]
    fn test_view_clamps_to_bounds() {
        let data = vec![0u8; 4 * 4 * 4];
        let bitmap = Bitmap::new(4, 4, &data).unwrap();

        let view = bitmap.view(3, 2, 10, 10);
        assert_eq!(view.width(), 1);
        assert_eq!(view.height(), 2);

        let empty = bitmap.view(9, 9, 1, 1);
        assert_eq!(empty.width(), 0);
        assert_eq!(empty.height(), 0);
    }
}
