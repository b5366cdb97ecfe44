use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Film edge. Serialized as `"LEFT"` / `"RIGHT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per film edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerSide<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Side, T) -> U) -> PerSide<U> {
        PerSide {
            left: f(Side::Left, self.left),
            right: f(Side::Right, self.right),
        }
    }
}

/// Horizontal strip `[x, x + width)` holding every perforation of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LaneRecord")]
pub struct LaneDefinition {
    side: Side,
    x: i32,
    width: i32,
}

#[derive(Deserialize)]
struct LaneRecord {
    side: Side,
    x: i32,
    width: i32,
}

impl TryFrom<LaneRecord> for LaneDefinition {
    type Error = Error;

    fn try_from(rec: LaneRecord) -> Result<Self, Self::Error> {
        Self::new(rec.side, rec.x, rec.width)
    }
}

impl LaneDefinition {
    pub fn new(side: Side, x: i32, width: i32) -> Result<Self, Error> {
        if width <= 0 {
            return Err(Error::InvalidLaneWidth { side, width });
        }
        Ok(Self { side, x, width })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn end_x(&self) -> i32 {
        self.x + self.width
    }
}

/// Expected vertical extent `[y, y + height)` of one perforation in a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AnchorRecord")]
pub struct AnchorDefinition {
    id: String,
    lane_side: Side,
    y: i32,
    height: i32,
}

#[derive(Deserialize)]
struct AnchorRecord {
    id: String,
    lane_side: Side,
    y: i32,
    height: i32,
}

impl TryFrom<AnchorRecord> for AnchorDefinition {
    type Error = Error;

    fn try_from(rec: AnchorRecord) -> Result<Self, Self::Error> {
        Self::new(rec.id, rec.lane_side, rec.y, rec.height)
    }
}

impl AnchorDefinition {
    pub fn new(id: impl Into<String>, lane_side: Side, y: i32, height: i32) -> Result<Self, Error> {
        let id = id.into();
        if height <= 0 {
            return Err(Error::InvalidAnchorHeight { id, height });
        }
        Ok(Self {
            id,
            lane_side,
            y,
            height,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lane_side(&self) -> Side {
        self.lane_side
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn end_y(&self) -> i32 {
        self.y + self.height
    }
}
