use nalgebra as na;

use crate::bbox::{BBox, Ltwh};
use crate::error::Error;

/// Two distinct image-space points. The pair fixes the direction and intercept of a line
/// and, for crossing tests, the x-extent that is considered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    p1: na::Point2<f64>,
    p2: na::Point2<f64>,
}

impl LineSegment {
    pub fn new(p1: na::Point2<f64>, p2: na::Point2<f64>) -> Result<Self, Error> {
        let finite = p1.coords.iter().chain(p2.coords.iter()).all(|c| c.is_finite());

        if !finite || p1 == p2 {
            return Err(Error::DegenerateInput {
                x1: p1.x,
                y1: p1.y,
                x2: p2.x,
                y2: p2.y,
            });
        }

        Ok(Self { p1, p2 })
    }

    #[inline]
    pub fn from_coords(coords: [[f64; 2]; 2]) -> Result<Self, Error> {
        let [[x1, y1], [x2, y2]] = coords;

        Self::new(na::Point2::new(x1, y1), na::Point2::new(x2, y2))
    }

    #[inline(always)]
    pub fn p1(&self) -> na::Point2<f64> {
        self.p1
    }

    #[inline(always)]
    pub fn p2(&self) -> na::Point2<f64> {
        self.p2
    }

    #[inline(always)]
    pub fn dx(&self) -> f64 {
        self.p2.x - self.p1.x
    }

    #[inline(always)]
    pub fn dy(&self) -> f64 {
        self.p2.y - self.p1.y
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.dx() == 0.0
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        self.dy() == 0.0
    }

    /// `None` for vertical segments.
    #[inline]
    pub fn slope(&self) -> Option<f64> {
        if self.is_vertical() {
            None
        } else {
            Some(self.dy() / self.dx())
        }
    }

    #[inline]
    pub fn intercept(&self) -> Option<f64> {
        self.slope().map(|m| self.p1.y - m * self.p1.x)
    }

    /// Height of the extended line at `x`.
    #[inline]
    pub fn y_at(&self, x: f64) -> Option<f64> {
        let m = self.slope()?;
        let b = self.p1.y - m * self.p1.x;

        Some(m * x + b)
    }

    #[inline]
    pub fn x_range(&self) -> (f64, f64) {
        (self.p1.x.min(self.p2.x), self.p1.x.max(self.p2.x))
    }
}

/// Stateless "does this box sit on the line" predicate used for counting and speed lines.
///
/// Only slanted segments can ever match: vertical and horizontal segments report `false`
/// for every box, including boxes they geometrically pass through. Callers placing lines
/// in image space must tilt them at least slightly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCrossTest {
    line: LineSegment,
}

impl LineCrossTest {
    #[inline]
    pub fn new(line: LineSegment) -> Self {
        Self { line }
    }

    pub fn from_points(p1: na::Point2<f64>, p2: na::Point2<f64>) -> Result<Self, Error> {
        Ok(Self::new(LineSegment::new(p1, p2)?))
    }

    #[inline]
    pub fn line(&self) -> &LineSegment {
        &self.line
    }

    /// True when the segment passes through the box interior or touches its boundary.
    pub fn rect_contains_line(&self, rect: &BBox<Ltwh>) -> Result<bool, Error> {
        rect.validate()?;

        if self.line.is_vertical() || self.line.is_horizontal() {
            return Ok(false);
        }

        Ok(self.crosses_valid(rect))
    }

    /// Same as `rect_contains_line` for a box that has already been validated.
    pub(crate) fn crosses_valid(&self, rect: &BBox<Ltwh>) -> bool {
        let (m, b) = match (self.line.slope(), self.line.intercept()) {
            (Some(m), Some(b)) if m != 0.0 => (m, b),
            _ => return false,
        };

        let (seg_lo, seg_hi) = self.line.x_range();
        let lo = seg_lo.max(rect.left());
        let hi = seg_hi.min(rect.right());

        if lo > hi {
            return false;
        }

        let (ya, yb) = (m * lo + b, m * hi + b);
        let (ymin, ymax) = (ya.min(yb), ya.max(yb));

        ymin <= rect.bottom() && ymax >= rect.top()
    }
}
