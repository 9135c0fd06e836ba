use geo_types::geometry::Point as _Point;

use super::flags::Dimension;
use super::GaiaCoord;
use crate::types;

/// XY vertex.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Point {
    pub point: _Point,
    pub srid: Option<i32>,
}

/// XYZ vertex.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct PointZ {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub srid: Option<i32>,
}

/// XYM vertex. `m` is a measure, not a spatial ordinate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct PointM {
    pub x: f64,
    pub y: f64,
    pub m: f64,
    pub srid: Option<i32>,
}

/// XYZM vertex.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct PointZM {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: f64,
    pub srid: Option<i32>,
}

impl Point {
    pub fn new(x: f64, y: f64, srid: Option<i32>) -> Self {
        Self {
            point: _Point::new(x, y),
            srid,
        }
    }

    /// Builds from the full ordinate set, discarding what this type does
    /// not carry.
    pub fn new_from_opt_vals(
        x: f64,
        y: f64,
        _z: Option<f64>,
        _m: Option<f64>,
        srid: Option<i32>,
    ) -> Self {
        Self::new(x, y, srid)
    }

    pub fn x(&self) -> f64 {
        self.point.x()
    }

    pub fn y(&self) -> f64 {
        self.point.y()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y, None)
    }
}

impl types::Point for Point {
    fn x(&self) -> f64 {
        self.point.x()
    }
    fn y(&self) -> f64 {
        self.point.y()
    }
}

impl PointZ {
    pub fn new(x: f64, y: f64, z: f64, srid: Option<i32>) -> Self {
        Self { x, y, z, srid }
    }

    pub fn new_from_opt_vals(
        x: f64,
        y: f64,
        z: Option<f64>,
        _m: Option<f64>,
        srid: Option<i32>,
    ) -> Self {
        Self::new(x, y, z.unwrap_or(f64::NAN), srid)
    }
}

impl From<(f64, f64, f64)> for PointZ {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z, None)
    }
}

impl types::Point for PointZ {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn opt_z(&self) -> Option<f64> {
        Some(self.z)
    }
}

impl PointM {
    pub fn new(x: f64, y: f64, m: f64, srid: Option<i32>) -> Self {
        Self { x, y, m, srid }
    }

    pub fn new_from_opt_vals(
        x: f64,
        y: f64,
        _z: Option<f64>,
        m: Option<f64>,
        srid: Option<i32>,
    ) -> Self {
        Self::new(x, y, m.unwrap_or(f64::NAN), srid)
    }
}

impl From<(f64, f64, f64)> for PointM {
    fn from((x, y, m): (f64, f64, f64)) -> Self {
        Self::new(x, y, m, None)
    }
}

impl types::Point for PointM {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn opt_m(&self) -> Option<f64> {
        Some(self.m)
    }
}

impl PointZM {
    pub fn new(x: f64, y: f64, z: f64, m: f64, srid: Option<i32>) -> Self {
        Self { x, y, z, m, srid }
    }

    pub fn new_from_opt_vals(
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        srid: Option<i32>,
    ) -> Self {
        Self::new(x, y, z.unwrap_or(f64::NAN), m.unwrap_or(f64::NAN), srid)
    }
}

impl From<(f64, f64, f64, f64)> for PointZM {
    fn from((x, y, z, m): (f64, f64, f64, f64)) -> Self {
        Self::new(x, y, z, m, None)
    }
}

impl types::Point for PointZM {
    fn x(&self) -> f64 {
        self.x
    }
    fn y(&self) -> f64 {
        self.y
    }
    fn opt_z(&self) -> Option<f64> {
        Some(self.z)
    }
    fn opt_m(&self) -> Option<f64> {
        Some(self.m)
    }
}

macro_rules! impl_gaia_coord {
    ($ptype:ident is $dim:ident) => {
        impl GaiaCoord for $ptype {
            fn dimension() -> Dimension {
                Dimension::$dim
            }

            fn new_from_opt_vals(
                x: f64,
                y: f64,
                z: Option<f64>,
                m: Option<f64>,
                srid: Option<i32>,
            ) -> Self {
                $ptype::new_from_opt_vals(x, y, z, m, srid)
            }
        }
    };
}

impl_gaia_coord!(Point is Xy);
impl_gaia_coord!(PointZ is Xyz);
impl_gaia_coord!(PointM is Xym);
impl_gaia_coord!(PointZM is Xyzm);
