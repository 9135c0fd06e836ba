use super::flags::GeometryClass;
use super::point::*;
use super::{GaiaCoord, Mbr};
use crate::types::Point as _;

macro_rules! point_container_type {
    // geometries holding a flat run of vertices
    ($geotype:ident named $itemname:ident) => {
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(PartialEq, Clone, Debug)]
        pub struct $geotype<P: GaiaCoord> {
            pub $itemname: Vec<P>,
            pub srid: Option<i32>,
        }

        impl<P: GaiaCoord> $geotype<P> {
            pub fn new() -> $geotype<P> {
                $geotype {
                    $itemname: Vec::new(),
                    srid: None,
                }
            }
        }

        impl<P: GaiaCoord> Default for $geotype<P> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<P: GaiaCoord> FromIterator<P> for $geotype<P> {
            #[inline]
            fn from_iter<I: IntoIterator<Item = P>>(iterable: I) -> $geotype<P> {
                let mut ret = $geotype::new();
                ret.$itemname.extend(iterable);
                ret
            }
        }
    };
}

macro_rules! geometry_container_type {
    // geometries holding other geometries
    ($geotype:ident contains $itemtype:ident named $itemname:ident) => {
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(PartialEq, Clone, Debug)]
        pub struct $geotype<P: GaiaCoord> {
            pub $itemname: Vec<$itemtype<P>>,
            pub srid: Option<i32>,
        }

        impl<P: GaiaCoord> $geotype<P> {
            pub fn new() -> $geotype<P> {
                $geotype {
                    $itemname: Vec::new(),
                    srid: None,
                }
            }
        }

        impl<P: GaiaCoord> Default for $geotype<P> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<P: GaiaCoord> FromIterator<$itemtype<P>> for $geotype<P> {
            #[inline]
            fn from_iter<I: IntoIterator<Item = $itemtype<P>>>(iterable: I) -> $geotype<P> {
                let mut ret = $geotype::new();
                ret.$itemname.extend(iterable);
                ret
            }
        }
    };
}

point_container_type!(LineStringT named points);
point_container_type!(MultiPointT named points);
geometry_container_type!(PolygonT contains LineStringT named rings);
geometry_container_type!(MultiLineStringT contains LineStringT named lines);
geometry_container_type!(MultiPolygonT contains PolygonT named polygons);

impl<P: GaiaCoord> LineStringT<P> {
    /// A ring is closed when its first and last vertices coincide in XY.
    /// Empty and single-vertex sequences count as closed.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.x() == last.x() && first.y() == last.y(),
            _ => true,
        }
    }

    /// Appends a copy of the first vertex when the ring is open.
    pub fn close_ring(&mut self) {
        if !self.is_closed() {
            if let Some(first) = self.points.first().cloned() {
                self.points.push(first);
            }
        }
    }
}

/// LineString type
pub type LineString = LineStringT<Point>;
/// LineStringZ type
pub type LineStringZ = LineStringT<PointZ>;
/// LineStringM type
pub type LineStringM = LineStringT<PointM>;
/// LineStringZM type
pub type LineStringZM = LineStringT<PointZM>;

/// Polygon type
pub type Polygon = PolygonT<Point>;
/// PolygonZ type
pub type PolygonZ = PolygonT<PointZ>;
/// PolygonM type
pub type PolygonM = PolygonT<PointM>;
/// PolygonZM type
pub type PolygonZM = PolygonT<PointZM>;

/// MultiPoint type
pub type MultiPoint = MultiPointT<Point>;
/// MultiPointZ type
pub type MultiPointZ = MultiPointT<PointZ>;
/// MultiPointM type
pub type MultiPointM = MultiPointT<PointM>;
/// MultiPointZM type
pub type MultiPointZM = MultiPointT<PointZM>;

/// MultiLineString type
pub type MultiLineString = MultiLineStringT<Point>;
/// MultiLineStringZ type
pub type MultiLineStringZ = MultiLineStringT<PointZ>;
/// MultiLineStringM type
pub type MultiLineStringM = MultiLineStringT<PointM>;
/// MultiLineStringZM type
pub type MultiLineStringZM = MultiLineStringT<PointZM>;

/// MultiPolygon type
pub type MultiPolygon = MultiPolygonT<Point>;
/// MultiPolygonZ type
pub type MultiPolygonZ = MultiPolygonT<PointZ>;
/// MultiPolygonM type
pub type MultiPolygonM = MultiPolygonT<PointM>;
/// MultiPolygonZM type
pub type MultiPolygonZM = MultiPolygonT<PointZM>;

/// Any geometry the BLOB format can carry.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Debug)]
pub enum GeometryT<P: GaiaCoord> {
    Point(P),
    LineString(LineStringT<P>),
    Polygon(PolygonT<P>),
    MultiPoint(MultiPointT<P>),
    MultiLineString(MultiLineStringT<P>),
    MultiPolygon(MultiPolygonT<P>),
    GeometryCollection(GeometryCollectionT<P>),
}

/// Geometry type
pub type Geometry = GeometryT<Point>;
/// GeometryZ type
pub type GeometryZ = GeometryT<PointZ>;
/// GeometryM type
pub type GeometryM = GeometryT<PointM>;
/// GeometryZM type
pub type GeometryZM = GeometryT<PointZM>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(PartialEq, Clone, Debug)]
pub struct GeometryCollectionT<P: GaiaCoord> {
    pub geometries: Vec<GeometryT<P>>,
    pub srid: Option<i32>,
}

impl<P: GaiaCoord> GeometryCollectionT<P> {
    pub fn new() -> GeometryCollectionT<P> {
        GeometryCollectionT {
            geometries: Vec::new(),
            srid: None,
        }
    }
}

impl<P: GaiaCoord> Default for GeometryCollectionT<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GaiaCoord> FromIterator<GeometryT<P>> for GeometryCollectionT<P> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = GeometryT<P>>>(iterable: I) -> GeometryCollectionT<P> {
        let mut ret = GeometryCollectionT::new();
        ret.geometries.extend(iterable);
        ret
    }
}

/// GeometryCollection type
pub type GeometryCollection = GeometryCollectionT<Point>;
/// GeometryCollectionZ type
pub type GeometryCollectionZ = GeometryCollectionT<PointZ>;
/// GeometryCollectionM type
pub type GeometryCollectionM = GeometryCollectionT<PointM>;
/// GeometryCollectionZM type
pub type GeometryCollectionZM = GeometryCollectionT<PointZM>;

impl<P: GaiaCoord> GeometryT<P> {
    pub fn class(&self) -> GeometryClass {
        match self {
            GeometryT::Point(_) => GeometryClass::Point,
            GeometryT::LineString(_) => GeometryClass::LineString,
            GeometryT::Polygon(_) => GeometryClass::Polygon,
            GeometryT::MultiPoint(_) => GeometryClass::MultiPoint,
            GeometryT::MultiLineString(_) => GeometryClass::MultiLineString,
            GeometryT::MultiPolygon(_) => GeometryClass::MultiPolygon,
            GeometryT::GeometryCollection(_) => GeometryClass::GeometryCollection,
        }
    }

    /// XY extent over every vertex. [`Mbr::is_null`] when the geometry has
    /// no vertices at all.
    pub fn envelope(&self) -> Mbr {
        let mut mbr = Mbr::new_null();
        self.expand_mbr(&mut mbr);
        mbr
    }

    fn expand_mbr(&self, mbr: &mut Mbr) {
        match self {
            GeometryT::Point(p) => mbr.expand(p.x(), p.y()),
            GeometryT::LineString(ls) => expand_points(&ls.points, mbr),
            GeometryT::Polygon(poly) => {
                for ring in &poly.rings {
                    expand_points(&ring.points, mbr);
                }
            }
            GeometryT::MultiPoint(mp) => expand_points(&mp.points, mbr),
            GeometryT::MultiLineString(mls) => {
                for line in &mls.lines {
                    expand_points(&line.points, mbr);
                }
            }
            GeometryT::MultiPolygon(mpoly) => {
                for poly in &mpoly.polygons {
                    for ring in &poly.rings {
                        expand_points(&ring.points, mbr);
                    }
                }
            }
            GeometryT::GeometryCollection(gc) => {
                for geom in &gc.geometries {
                    geom.expand_mbr(mbr);
                }
            }
        }
    }
}

fn expand_points<P: GaiaCoord>(points: &[P], mbr: &mut Mbr) {
    for p in points {
        mbr.expand(p.x(), p.y());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y, None)
    }

    #[test]
    fn ring_closing() {
        let mut open: LineString = vec![p(0., 0.), p(1., 0.), p(1., 1.)].into_iter().collect();
        assert!(!open.is_closed());
        open.close_ring();
        assert!(open.is_closed());
        assert_eq!(open.points.len(), 4);
        assert_eq!(open.points[3], p(0., 0.));

        // closing twice is a no-op
        open.close_ring();
        assert_eq!(open.points.len(), 4);

        assert!(LineString::new().is_closed());
    }

    #[test]
    fn envelope_spans_all_parts() {
        let line1: LineString = vec![p(0., 0.), p(2., 1.)].into_iter().collect();
        let line2: LineString = vec![p(-3., 5.), p(1., -1.)].into_iter().collect();
        let geom = GeometryT::MultiLineString(MultiLineStringT {
            lines: vec![line1, line2],
            srid: None,
        });
        let mbr = geom.envelope();
        assert_eq!((mbr.min_x, mbr.min_y, mbr.max_x, mbr.max_y), (-3., -1., 2., 5.));
    }

    #[test]
    fn empty_envelope_is_null() {
        let geom = GeometryT::<Point>::GeometryCollection(GeometryCollectionT::new());
        assert!(geom.envelope().is_null());
    }

    #[test]
    fn class_reports_the_variant() {
        assert_eq!(
            GeometryT::Point(p(0., 0.)).class(),
            GeometryClass::Point
        );
        assert_eq!(
            GeometryT::<Point>::MultiPolygon(MultiPolygonT::new()).class(),
            GeometryClass::MultiPolygon
        );
    }
}
