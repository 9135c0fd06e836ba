//! Read and write geometries in the SpatiaLite internal BLOB format.
//!
//! This is the binary layout the [SpatiaLite](https://www.gaia-gis.it/gaia-sins/)
//! extension stores in SQLite geometry columns: a framed little- or
//! big-endian header (SRID, minimum bounding rectangle, root type code)
//! followed by a recursive geometry payload. LineStrings and polygon rings
//! may additionally use a SpatiaLite-only delta compression where interior
//! vertices are stored as f32 offsets between absolute f64 endpoints.

mod encoding;
pub mod flags;

pub mod point;
pub use point::*;
pub mod geometry;
pub use geometry::*;
mod reader;
pub use reader::{read_header, BlobHeader, GaiaReader};
mod writer;
pub use writer::GaiaWriter;

use std::fmt;

use crate::types;
use flags::Dimension;

/// First byte of every geometry blob.
pub const MARK_START: u8 = 0x00;
/// Last byte of every geometry blob.
pub const MARK_END: u8 = 0xFE;
/// Separates the MBR from the root type code, at byte 38.
pub const MARK_MBR: u8 = 0x7C;
/// Precedes each child inside a Multi* or GeometryCollection payload.
pub const MARK_ENTITY: u8 = 0x69;

/// Endian marker for big-endian payloads.
pub const ENDIAN_BIG: u8 = 0x00;
/// Endian marker for little-endian payloads.
pub const ENDIAN_LITTLE: u8 = 0x01;

/// Shortest well-formed blob: the 43-byte header, one payload byte and the
/// end marker.
pub const MIN_BLOB_LEN: usize = 45;

/// Byte order of a blob. Every i32/f32/f64 in the header and payload is
/// stored in this order; the marker at byte 1 announces it.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn marker(self) -> u8 {
        match self {
            Endian::Big => ENDIAN_BIG,
            Endian::Little => ENDIAN_LITTLE,
        }
    }

    pub fn from_marker(byte: u8) -> Option<Endian> {
        match byte {
            ENDIAN_BIG => Some(Endian::Big),
            ENDIAN_LITTLE => Some(Endian::Little),
            _ => None,
        }
    }
}

/// Minimum bounding rectangle stored in the blob header.
///
/// The reader consumes but does not trust it; the writer always recomputes
/// it from the geometry.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Mbr {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Mbr {
    /// The empty extent; expanding it with any point makes it that point.
    pub fn new_null() -> Mbr {
        Mbr {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn is_null(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

/// Vertex types the codec can materialize.
///
/// The implementing type decides which ordinates it accepts: a blob
/// carrying more than the type stores still decodes (the extra ordinates
/// are consumed and discarded), and declared-but-absent ordinates arrive
/// as `None`.
pub trait GaiaCoord: types::Point + Clone + fmt::Debug + Sized {
    /// Ordinates this vertex type stores.
    fn dimension() -> Dimension;

    /// Builds a vertex from the full decoded ordinate set.
    fn new_from_opt_vals(
        x: f64,
        y: f64,
        z: Option<f64>,
        m: Option<f64>,
        srid: Option<i32>,
    ) -> Self;
}

#[cfg(test)]
#[rustfmt::skip]
fn hex_to_vec(hexstr: &str) -> Vec<u8> {
    hexstr.as_bytes().chunks(2).map(|chars| {
        let hb = if chars[0] <= 57 { chars[0] - 48 } else { chars[0] - 55 };
        let lb = if chars[1] <= 57 { chars[1] - 48 } else { chars[1] - 55 };
        hb * 16 + lb
    }).collect::<Vec<_>>()
}

#[test]
#[rustfmt::skip]
fn test_point_blob() {
    // SELECT geometry: POINT(1 2), SRID 4326, little-endian, 60 bytes
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407C01000000000000000000F03F0000000000000040FE");
    assert_eq!(blob.len(), 60);
    assert_eq!(&blob[..6], &[0x00, 0x01, 0xE6, 0x10, 0x00, 0x00]);
    // absolute coordinates sit at payload offsets 43 and 51
    assert_eq!(blob[43..51], 1.0f64.to_le_bytes());
    assert_eq!(blob[51..59], 2.0f64.to_le_bytes());

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::Point(Point::new(1.0, 2.0, Some(4326))));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_point_blob_big_endian() {
    // the same POINT(1 2) with every numeric field byte-swapped
    let blob = hex_to_vec("0000000010E63FF000000000000040000000000000003FF000000000000040000000000000007C000000013FF00000000000004000000000000000FE");
    assert_eq!(blob.len(), 60);

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::Point(Point::new(1.0, 2.0, Some(4326))));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Big, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_linestring_blob() {
    // LINESTRING(0 0, 1 1, 2 2), root type 2, count 3, six f64
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000004000000000000000407C020000000300000000000000000000000000000000000000000000000000F03F000000000000F03F00000000000000400000000000000040FE");
    let p = |x, y| Point::new(x, y, Some(4326));

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let expected = LineStringT::<Point> { points: vec![p(0., 0.), p(1., 1.), p(2., 2.)], srid: Some(4326) };
    assert_eq!(geom, GeometryT::LineString(expected));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_compressed_linestring_blob() {
    // the same LINESTRING(0 0, 1 1, 2 2) compressed: root type 1000002,
    // absolute endpoints as f64, the middle vertex as two f32 deltas of 1.0
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000004000000000000000407C42420F0003000000000000000000000000000000000000000000803F0000803F00000000000000400000000000000040FE");
    assert_eq!(blob.len(), 88);
    let p = |x, y| Point::new(x, y, Some(4326));

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let expected = LineStringT::<Point> { points: vec![p(0., 0.), p(1., 1.), p(2., 2.)], srid: Some(4326) };
    assert_eq!(geom, GeometryT::LineString(expected));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, true).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_polygon_blob() {
    // POLYGON((0 0, 10 0, 0 10, 0 0), (1 1, 2 1, 1 2, 1 1)): ringCount 2,
    // shell first, then the hole
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000244000000000000024407C0300000002000000040000000000000000000000000000000000000000000000000024400000000000000000000000000000000000000000000024400000000000000000000000000000000004000000000000000000F03F000000000000F03F0000000000000040000000000000F03F000000000000F03F0000000000000040000000000000F03F000000000000F03FFE");
    assert_eq!(blob.len(), 184);
    let p = |x, y| Point::new(x, y, Some(4326));

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let shell = LineStringT::<Point> { points: vec![p(0., 0.), p(10., 0.), p(0., 10.), p(0., 0.)], srid: Some(4326) };
    let hole = LineStringT::<Point> { points: vec![p(1., 1.), p(2., 1.), p(1., 2.), p(1., 1.)], srid: Some(4326) };
    let expected = PolygonT::<Point> { rings: vec![shell, hole], srid: Some(4326) };
    assert_eq!(geom, GeometryT::Polygon(expected));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_multipoint_blob() {
    // MULTIPOINT(1 2, 3 4): count 2, each child prefixed by 0x69 and its
    // own point type code
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000084000000000000010407C04000000020000006901000000000000000000F03F0000000000000040690100000000000000000008400000000000001040FE");
    assert_eq!(blob.len(), 90);
    let p = |x, y| Point::new(x, y, Some(4326));

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let expected = MultiPointT::<Point> { points: vec![p(1., 2.), p(3., 4.)], srid: Some(4326) };
    assert_eq!(geom, GeometryT::MultiPoint(expected));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_geometry_collection_blob() {
    // GEOMETRYCOLLECTION(POINT(5 5), LINESTRING(0 0, 1 1)): each child
    // carries its own entity marker and full type tag
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000144000000000000014407C070000000200000069010000000000000000001440000000000000144069020000000200000000000000000000000000000000000000000000000000F03F000000000000F03FFE");
    let p = |x, y| Point::new(x, y, Some(4326));

    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let line = LineStringT::<Point> { points: vec![p(0., 0.), p(1., 1.)], srid: Some(4326) };
    let expected = GeometryCollectionT::<Point> {
        geometries: vec![
            GeometryT::Point(p(5., 5.)),
            GeometryT::LineString(line),
        ],
        srid: Some(4326),
    };
    assert_eq!(geom, GeometryT::GeometryCollection(expected));

    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_dimension_variants() {
    // POINT Z (1 2 3), type 1001
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407CE9030000000000000000F03F00000000000000400000000000000840FE");
    let geom = GaiaReader::<PointZ>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::Point(PointZ::new(1.0, 2.0, 3.0, Some(4326))));

    // POINT M (1 2 3), type 2001
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407CD1070000000000000000F03F00000000000000400000000000000840FE");
    let geom = GaiaReader::<PointM>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::Point(PointM::new(1.0, 2.0, 3.0, Some(4326))));

    // POINT ZM (1 2 3 4), type 3001
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407CB90B0000000000000000F03F000000000000004000000000000008400000000000001040FE");
    let geom = GaiaReader::<PointZM>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::Point(PointZM::new(1.0, 2.0, 3.0, 4.0, Some(4326))));
}

#[test]
#[rustfmt::skip]
fn test_empty_containers() {
    // MULTIPOINT EMPTY: count 0, zeroed envelope
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000000000000000000000007C0400000000000000FE");
    assert_eq!(blob.len(), 48);
    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let mut expected = MultiPointT::<Point>::new();
    expected.srid = Some(4326);
    assert_eq!(geom, GeometryT::MultiPoint(expected));
    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);

    // GEOMETRYCOLLECTION EMPTY
    let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000000000000000000000007C0700000000000000FE");
    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    let mut expected = GeometryCollectionT::<Point>::new();
    expected.srid = Some(4326);
    assert_eq!(geom, GeometryT::GeometryCollection(expected));
    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, false).unwrap();
    assert_eq!(written, blob);
}

#[test]
#[rustfmt::skip]
fn test_compressed_boundary_counts() {
    let p = |x, y| Point::new(x, y, Some(4326));

    // single vertex: just the absolute f64 pair, no delta section
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407C42420F0001000000000000000000F03F0000000000000040FE");
    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::LineString(LineStringT { points: vec![p(1., 2.)], srid: Some(4326) }));
    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, true).unwrap();
    assert_eq!(written, blob);

    // two vertices: two absolutes, zero deltas
    let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000084000000000000010407C42420F0002000000000000000000F03F000000000000004000000000000008400000000000001040FE");
    let geom = GaiaReader::<Point>::new().read(&blob).unwrap().unwrap();
    assert_eq!(geom, GeometryT::LineString(LineStringT { points: vec![p(1., 2.), p(3., 4.)], srid: Some(4326) }));
    let written = GaiaWriter::new().write(&geom, 4326, Endian::Little, true).unwrap();
    assert_eq!(written, blob);
}

#[test]
fn test_endian_equivalence() {
    let p = |x, y| Point::new(x, y, Some(4326));
    let shell: LineStringT<Point> = vec![p(0., 0.), p(8., 0.), p(8., 8.), p(0., 8.), p(0., 0.)]
        .into_iter()
        .collect();
    let geom = GeometryT::Polygon(PolygonT {
        rings: vec![shell],
        srid: Some(4326),
    });

    let writer = GaiaWriter::new();
    let reader = GaiaReader::<Point>::new();
    for compress in [false, true] {
        let big = writer.write(&geom, 4326, Endian::Big, compress).unwrap();
        let little = writer.write(&geom, 4326, Endian::Little, compress).unwrap();
        assert_ne!(big, little);
        let from_big = reader.read(&big).unwrap().unwrap();
        let from_little = reader.read(&little).unwrap().unwrap();
        assert_eq!(from_big, from_little);
        assert_eq!(from_big, geom);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_serde_point() {
        let point = Point::new(10.0, 20.0, Some(4326));
        let serialized = serde_json::to_string(&point).unwrap();
        let deserialized: Point = serde_json::from_str(&serialized).unwrap();
        assert_eq!(point, deserialized);
    }

    #[test]
    fn test_serde_geometry() {
        let line: LineStringZ = vec![
            PointZ::new(1.0, 2.0, 3.0, Some(4326)),
            PointZ::new(4.0, 5.0, 6.0, Some(4326)),
        ]
        .into_iter()
        .collect();
        let geometry = GeometryT::LineString(line);

        let serialized = serde_json::to_string(&geometry).unwrap();
        let deserialized: GeometryZ = serde_json::from_str(&serialized).unwrap();
        assert_eq!(geometry, deserialized);
    }
}
