use crate::image::ImageView;

/// Axis-aligned integer rectangle, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalizes two arbitrary corner points into a rectangle.
    pub fn from_points(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: x1.abs_diff(x2).try_into().unwrap_or(i32::MAX),
            height: y1.abs_diff(y2).try_into().unwrap_or(i32::MAX),
        }
    }

    pub fn end_x(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn end_y(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        self.x <= px && px < self.end_x() && self.y <= py && py < self.end_y()
    }

    /// Crops `frame` to this rectangle after clamping to the frame bounds.
    ///
    /// Returns `None` when the clamped rectangle has no area.
    pub fn crop<'a, T>(&self, frame: &ImageView<'a, T>) -> Option<ImageView<'a, T>> {
        let w = i32::try_from(frame.width()).unwrap_or(i32::MAX);
        let h = i32::try_from(frame.height()).unwrap_or(i32::MAX);

        let x1 = self.x.clamp(0, w);
        let y1 = self.y.clamp(0, h);
        let x2 = self.end_x().clamp(0, w);
        let y2 = self.end_y().clamp(0, h);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        frame
            .subview(
                x1 as usize,
                y1 as usize,
                (x2 - x1) as usize,
                (y2 - y1) as usize,
            )
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;
    use crate::Image;

    #[test]
    fn from_points_is_order_independent() {
        let a = Rect::from_points(120, 80, 100, 40);
        let b = Rect::from_points(100, 40, 120, 80);
        assert_eq!(a, b);
        assert_eq!(a, Rect::new(100, 40, 20, 40));
    }

    #[test]
    fn containment_is_half_open() {
        let r = Rect::new(10, 20, 5, 5);
        assert!(r.contains_point(10, 20));
        assert!(r.contains_point(14, 24));
        assert!(!r.contains_point(15, 24));
        assert!(!r.contains_point(14, 25));
        assert!(!r.contains_point(9, 22));
        assert_eq!(r.center(), (12, 22));
    }

    #[test]
    fn crop_clamps_to_frame() {
        let frame = Image::from_fn(8, 6, |x, y| (y * 8 + x) as u8);
        let view = frame.as_view();

        let crop = Rect::new(-3, 4, 5, 10).crop(&view).expect("partial overlap");
        assert_eq!((crop.width(), crop.height()), (2, 2));
        assert_eq!(crop.row(0), &[32, 33]);
        assert_eq!(crop.row(1), &[40, 41]);

        let inside = Rect::new(6, 0, 100, 100).crop(&view).expect("overlap");
        assert_eq!((inside.width(), inside.height()), (2, 6));
    }

    #[test]
    fn crop_outside_or_degenerate_is_none() {
        let frame = Image::new_fill(8, 6, 0u8);
        let view = frame.as_view();
        assert!(Rect::new(8, 0, 4, 4).crop(&view).is_none());
        assert!(Rect::new(-10, 0, 10, 4).crop(&view).is_none());
        assert!(Rect::new(2, 2, 0, 3).crop(&view).is_none());
        assert!(Rect::new(2, 7, 3, 3).crop(&view).is_none());
    }
}
