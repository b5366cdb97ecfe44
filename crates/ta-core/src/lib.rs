//! Foundational primitives for film perforation alignment.
//!
//! ## Frames and Stride
//! Frames are borrowed [`ImageView`]s with element stride (not byte stride).
//! `stride` is the distance, in elements, between adjacent row starts and may
//! be greater than `width`, so camera buffers with row padding can be used
//! without copying. Any pixel type implementing [`Luma`] can be fed to the
//! engine; 3-channel pixels are interpreted in BGR order.
//!
//! ## Coordinates
//! All geometry uses integer pixel coordinates with the origin at the top-left
//! corner, `x` growing right and `y` growing down. Rectangles are half-open:
//! a point `(px, py)` is inside when `x <= px < x + width` and
//! `y <= py < y + height`.
//!
//! ## Regions of Interest
//! [`Roi`] is a single geometry record parameterised by a sealed kind marker.
//! [`RawRoi`] is what the operator draws; [`AlignedRoi`] is the result of
//! snapping a group of raw regions onto one shared lane.

mod border;
mod error;
mod geom;
mod image;
mod pixel;
mod rect;
mod roi;

pub use border::{BorderMode, map_index};
pub use error::Error;
pub use geom::{AnchorDefinition, LaneDefinition, PerSide, Side};
pub use image::{Image, ImageView};
pub use pixel::Luma;
pub use rect::Rect;
pub use roi::{Aligned, AlignedRoi, MIN_RAW_ROI_SIZE, Raw, RawRoi, Roi, RoiKind, RoiRecord};
