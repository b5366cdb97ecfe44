use crate::Error;

/// Owned frame, rows packed without padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    pixels: Vec<T>,
}

impl<T> Image<T> {
    /// Wraps `pixels`, which must hold exactly `width * height` samples.
    pub fn from_vec(width: usize, height: usize, pixels: Vec<T>) -> Result<Self, Error> {
        let expected = packed_len(width, height)?;
        if pixels.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a frame by evaluating `f(x, y)` for every pixel, row by row.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            pixels: &self.pixels,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }
}

/// Borrowed frame whose rows may be padded, as handed out by capture
/// drivers. Read-only.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    pixels: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    /// Views a caller-owned buffer with `stride` samples between row starts.
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        pixels: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }
        let needed = strided_len(width, height, stride).ok_or(Error::OutOfBounds)?;
        if pixels.len() < needed {
            return Err(Error::SizeMismatch {
                expected: needed,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row `y`. Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row {y} outside view of height {}", self.height);
        let start = y * self.stride;
        &self.pixels[start..start + self.width]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &'a [T]> + use<'a, T> {
        let (pixels, width, stride) = (self.pixels, self.width, self.stride);
        (0..self.height).map(move |y| &pixels[y * stride..y * stride + width])
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        (x < self.width && y < self.height)
            .then(|| self.pixels.get(y * self.stride + x))
            .flatten()
    }

    /// The `width x height` window whose top-left pixel is `(x, y)`.
    ///
    /// Shares this view's stride; fails unless the window lies fully inside.
    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(x, width, self.width) || !fits(y, height, self.height) {
            return Err(Error::OutOfBounds);
        }
        if width == 0 || height == 0 {
            return Ok(ImageView {
                width,
                height,
                stride: self.stride,
                pixels: &[],
            });
        }

        let offset = y * self.stride + x;
        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            pixels: &self.pixels[offset..],
        })
    }
}

fn packed_len(width: usize, height: usize) -> Result<usize, Error> {
    width.checked_mul(height).ok_or(Error::OutOfBounds)
}

/// Samples spanned by `height` rows of `width`, the last one unpadded.
fn strided_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    match height {
        0 => Some(0),
        _ if width == 0 => Some(0),
        h => (h - 1).checked_mul(stride)?.checked_add(width),
    }
}
