/// Pixel types that can be reduced to a single intensity channel.
///
/// Reference capture and live measurement go through the same conversion, so
/// any consistent mapping is valid.
pub trait Luma: Copy {
    fn luma(self) -> f32;
}

impl Luma for u8 {
    #[inline]
    fn luma(self) -> f32 {
        self as f32
    }
}

impl Luma for u16 {
    #[inline]
    fn luma(self) -> f32 {
        self as f32
    }
}

impl Luma for f32 {
    #[inline]
    fn luma(self) -> f32 {
        self
    }
}

/// Interleaved 8-bit BGR, weighted with the BT.601 luma coefficients.
impl Luma for [u8; 3] {
    #[inline]
    fn luma(self) -> f32 {
        let [b, g, r] = self;
        0.114 * b as f32 + 0.587 * g as f32 + 0.299 * r as f32
    }
}
