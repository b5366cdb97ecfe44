use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::Error;
use crate::geom::{AnchorDefinition, LaneDefinition};
use crate::image::ImageView;
use crate::rect::Rect;

/// Minimum width and height, in pixels, a drawn region must exceed.
pub const MIN_RAW_ROI_SIZE: i32 = 5;

mod sealed {
    pub trait Sealed {}
}

/// Closed set of region variants.
pub trait RoiKind: sealed::Sealed + fmt::Debug + Clone + Copy + PartialEq + Eq {
    /// Transport tag, also used in `Display`.
    const NAME: &'static str;
}

/// Operator-drawn region, not yet snapped to a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raw;

/// Region whose `x`/`width` were overwritten with its lane's shared span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligned;

impl sealed::Sealed for Raw {}
impl sealed::Sealed for Aligned {}

impl RoiKind for Raw {
    const NAME: &'static str = "raw";
}

impl RoiKind for Aligned {
    const NAME: &'static str = "aligned";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roi<K: RoiKind> {
    id: String,
    rect: Rect,
    kind: PhantomData<K>,
}

pub type RawRoi = Roi<Raw>;
pub type AlignedRoi = Roi<Aligned>;

impl<K: RoiKind> Roi<K> {
    fn with_id(id: String, rect: Rect) -> Self {
        Self {
            id,
            rect,
            kind: PhantomData,
        }
    }

    fn fresh(rect: Rect) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), rect)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.width
    }

    pub fn height(&self) -> i32 {
        self.rect.height
    }

    pub fn end_x(&self) -> i32 {
        self.rect.end_x()
    }

    pub fn end_y(&self) -> i32 {
        self.rect.end_y()
    }

    pub fn center(&self) -> (i32, i32) {
        self.rect.center()
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        self.rect.contains_point(px, py)
    }

    pub fn crop<'a, T>(&self, frame: &ImageView<'a, T>) -> Option<ImageView<'a, T>> {
        self.rect.crop(frame)
    }
}

impl RawRoi {
    /// Builds a region from two drag corners using [`MIN_RAW_ROI_SIZE`].
    pub fn from_points(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        Self::from_points_with_min(x1, y1, x2, y2, MIN_RAW_ROI_SIZE)
    }

    /// Returns `None` unless both sides are strictly larger than `min_size`.
    pub fn from_points_with_min(x1: i32, y1: i32, x2: i32, y2: i32, min_size: i32) -> Option<Self> {
        let rect = Rect::from_points(x1, y1, x2, y2);
        if rect.width <= min_size || rect.height <= min_size {
            return None;
        }
        Some(Self::fresh(rect))
    }
}

impl AlignedRoi {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::fresh(Rect::new(x, y, width, height))
    }

    /// Rebuilds the region an anchor was recorded from, keeping its id.
    pub fn from_anchor(lane: &LaneDefinition, anchor: &AnchorDefinition) -> Self {
        Self::with_id(
            anchor.id().to_owned(),
            Rect::new(lane.x(), anchor.y(), lane.width(), anchor.height()),
        )
    }
}

impl<K: RoiKind> fmt::Display for Roi<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.id.chars().take(4).collect();
        write!(
            f,
            "[{}] ID:{}.. @({},{}) {}x{}",
            K::NAME.to_uppercase(),
            short,
            self.rect.x,
            self.rect.y,
            self.rect.width,
            self.rect.height
        )
    }
}

/// Transport shape of a region: `{id, type, x, y, w, h}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl<K: RoiKind> From<&Roi<K>> for RoiRecord {
    fn from(roi: &Roi<K>) -> Self {
        Self {
            id: roi.id.clone(),
            kind: K::NAME.to_owned(),
            x: roi.rect.x,
            y: roi.rect.y,
            w: roi.rect.width,
            h: roi.rect.height,
        }
    }
}

impl<K: RoiKind> TryFrom<RoiRecord> for Roi<K> {
    type Error = Error;

    fn try_from(rec: RoiRecord) -> Result<Self, Self::Error> {
        if rec.kind != K::NAME {
            return Err(Error::RoiKindMismatch {
                expected: K::NAME,
                found: rec.kind,
            });
        }
        Ok(Self::with_id(rec.id, Rect::new(rec.x, rec.y, rec.w, rec.h)))
    }
}

impl<K: RoiKind> Serialize for Roi<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RoiRecord::from(self).serialize(serializer)
    }
}

impl<'de, K: RoiKind> Deserialize<'de> for Roi<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rec = RoiRecord::deserialize(deserializer)?;
        Self::try_from(rec).map_err(serde::de::Error::custom)
    }
}
