use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::error::Error;

pub trait BBoxFormat: std::fmt::Debug + Copy + PartialEq {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Axis-aligned box in image space. Image y grows downwards, so `top <= bottom`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BBox<F: BBoxFormat>([f64; 4], PhantomData<F>);

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        BBox([left, top, width, height], Default::default())
    }

    #[inline(always)]
    pub fn left(&self) -> f64 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f64 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f64 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f64 {
        self.0[3]
    }

    #[inline(always)]
    pub fn right(&self) -> f64 {
        self.0[0] + self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f64 {
        self.0[1] + self.0[3]
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Rejects boxes that have no interior: non-positive or non-finite sides.
    pub fn validate(&self) -> Result<(), Error> {
        let (width, height) = (self.width(), self.height());

        // `!(x > 0.0)` also catches NaN
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(Error::InvalidGeometry { width, height });
        }

        Ok(())
    }
}
