use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};
use crate::error::Error;

/// One foreground blob for one frame: (left,top) and (width,height) of its bounding box
/// plus the blob's own area, which is usually smaller than the box area.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    #[serde(rename = "l")]
    pub left: f64,
    #[serde(rename = "t")]
    pub top: f64,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
    #[serde(rename = "a")]
    pub area: f64,
}

impl Candidate {
    #[inline]
    pub fn new(bbox: BBox<Ltwh>, area: f64) -> Self {
        Self {
            left: bbox.left(),
            top: bbox.top(),
            width: bbox.width(),
            height: bbox.height(),
            area,
        }
    }

    /// Candidate whose blob fills its bounding box.
    #[inline]
    pub fn from_bbox(bbox: BBox<Ltwh>) -> Self {
        Self::new(bbox, bbox.area())
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltwh> {
        BBox::ltwh(self.left, self.top, self.width, self.height)
    }

    /// The box needs an interior and the blob a positive, finite area.
    pub fn validate(&self) -> Result<(), Error> {
        self.bbox().validate()?;

        if !(self.area > 0.0) || !self.area.is_finite() {
            return Err(Error::InvalidArea { area: self.area });
        }

        Ok(())
    }
}
