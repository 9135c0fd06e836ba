use std::io::Read;
use std::marker::PhantomData;

use super::encoding::Cursor;
use super::flags::{Dimension, GeometryClass, TypeInfo};
use super::geometry::*;
use super::point::PointZM;
use super::{Endian, GaiaCoord, Mbr, MARK_END, MARK_ENTITY, MARK_MBR, MARK_START, MIN_BLOB_LEN};
use crate::error::Error;
use crate::types::PrecisionModel;

/// Collection payloads nested deeper than this are treated as corrupt.
/// SpatiaLite itself never nests collections; the cap only exists to keep
/// hostile input from exhausting the stack.
const MAX_NESTING: usize = 64;

/// Header fields of a geometry blob, exposed as metadata.
///
/// The MBR is reported exactly as stored; it is not validated against the
/// payload.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct BlobHeader {
    pub endian: Endian,
    pub srid: i32,
    pub mbr: Mbr,
    pub type_code: i32,
}

fn well_framed(blob: &[u8]) -> bool {
    blob.len() >= MIN_BLOB_LEN
        && blob[0] == MARK_START
        && blob[blob.len() - 1] == MARK_END
        && blob[38] == MARK_MBR
}

/// Parses the 43-byte header without touching the payload.
///
/// Returns `None` for anything that is not framed as a geometry blob.
pub fn read_header(blob: &[u8]) -> Result<Option<BlobHeader>, Error> {
    if !well_framed(blob) {
        return Ok(None);
    }
    let endian = Endian::from_marker(blob[1]).ok_or(Error::MalformedEndian { found: blob[1] })?;
    let mut cur = Cursor::new(blob, endian);
    cur.skip(2, "blob header")?;
    let srid = cur.read_i32("srid")?;
    let mbr = Mbr {
        min_x: cur.read_f64("mbr min x")?,
        min_y: cur.read_f64("mbr min y")?,
        max_x: cur.read_f64("mbr max x")?,
        max_y: cur.read_f64("mbr max y")?,
    };
    cur.skip(1, "mbr marker")?;
    let offset = cur.position();
    let type_code = cur.read_i32("root type")?;
    TypeInfo::classify(type_code, offset)?;
    Ok(Some(BlobHeader {
        endian,
        srid,
        mbr,
        type_code,
    }))
}

/// Decodes SpatiaLite geometry blobs into [`GeometryT`] values.
///
/// The vertex type parameter is the accepted-ordinates mask: a
/// `GaiaReader<Point>` materializes XY no matter what the blob declares
/// (extra ordinates are consumed and discarded), while the default
/// `GaiaReader<PointZM>` keeps everything, filling absent ordinates with
/// NaN.
pub struct GaiaReader<P = PointZM> {
    precision: PrecisionModel,
    repair_rings: bool,
    handle_srid: bool,
    vertex: PhantomData<P>,
}

impl<P: GaiaCoord> Default for GaiaReader<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GaiaCoord> GaiaReader<P> {
    pub fn new() -> GaiaReader<P> {
        GaiaReader {
            precision: PrecisionModel::Floating,
            repair_rings: false,
            handle_srid: true,
            vertex: PhantomData,
        }
    }

    /// Quantizer applied to every decoded ordinate.
    pub fn precision_model(mut self, precision: PrecisionModel) -> Self {
        self.precision = precision;
        self
    }

    /// When set, unclosed polygon rings are closed on construction.
    pub fn repair_rings(mut self, repair: bool) -> Self {
        self.repair_rings = repair;
        self
    }

    /// When unset, the blob's SRID is dropped and the output carries none.
    pub fn handle_srid(mut self, handle: bool) -> Self {
        self.handle_srid = handle;
        self
    }

    /// Decodes one blob.
    ///
    /// `Ok(None)` means the bytes are not framed as a geometry (too short,
    /// or a start/end/MBR marker is off) and the caller may skip them.
    /// Everything else that goes wrong is a hard error.
    pub fn read(&self, blob: &[u8]) -> Result<Option<GeometryT<P>>, Error> {
        if !well_framed(blob) {
            return Ok(None);
        }
        let endian =
            Endian::from_marker(blob[1]).ok_or(Error::MalformedEndian { found: blob[1] })?;

        // the end marker is already validated; excluding it from the
        // cursor guarantees no payload read can run past it
        let mut cur = Cursor::new(&blob[..blob.len() - 1], endian);
        cur.skip(2, "blob header")?;
        let srid = cur.read_i32("srid")?;
        // envelope is consumed but never trusted for child geometries
        cur.skip(32, "mbr")?;
        cur.skip(1, "mbr marker")?;
        let offset = cur.position();
        let code = cur.read_i32("root type")?;
        let info = TypeInfo::classify(code, offset)?;

        let srid = self.handle_srid.then_some(srid);
        let geom = self.read_geometry(&mut cur, info, srid, 0)?;
        Ok(Some(geom))
    }

    /// Drains `raw` fully into memory, then decodes it like [`read`].
    ///
    /// [`read`]: GaiaReader::read
    pub fn read_stream<R: Read>(&self, raw: &mut R) -> Result<Option<GeometryT<P>>, Error> {
        let mut blob = Vec::new();
        raw.read_to_end(&mut blob)?;
        self.read(&blob)
    }

    fn read_geometry(
        &self,
        cur: &mut Cursor,
        info: TypeInfo,
        srid: Option<i32>,
        depth: usize,
    ) -> Result<GeometryT<P>, Error> {
        if depth > MAX_NESTING {
            return Err(Error::CorruptPayload {
                offset: cur.position(),
                context: "geometry nested too deeply",
            });
        }
        match info.class() {
            GeometryClass::Point => Ok(GeometryT::Point(self.read_point(cur, info, srid)?)),
            GeometryClass::LineString => {
                Ok(GeometryT::LineString(self.read_linestring(cur, info, srid)?))
            }
            GeometryClass::Polygon => Ok(GeometryT::Polygon(self.read_polygon(cur, info, srid)?)),
            GeometryClass::MultiPoint => {
                let count = read_count(cur, "point count")?;
                let mut points = Vec::with_capacity(count.min(cur.remaining() / 16));
                for _ in 0..count {
                    let child = self.read_child_tag(cur, GeometryClass::Point)?;
                    points.push(self.read_point(cur, child, srid)?);
                }
                Ok(GeometryT::MultiPoint(MultiPointT { points, srid }))
            }
            GeometryClass::MultiLineString => {
                let count = read_count(cur, "linestring count")?;
                let mut lines = Vec::with_capacity(count.min(cur.remaining() / 8));
                for _ in 0..count {
                    // children carry their own tags and may be compressed
                    // even under an uncompressed container
                    let child = self.read_child_tag(cur, GeometryClass::LineString)?;
                    lines.push(self.read_linestring(cur, child, srid)?);
                }
                Ok(GeometryT::MultiLineString(MultiLineStringT { lines, srid }))
            }
            GeometryClass::MultiPolygon => {
                let count = read_count(cur, "polygon count")?;
                let mut polygons = Vec::with_capacity(count.min(cur.remaining() / 8));
                for _ in 0..count {
                    let child = self.read_child_tag(cur, GeometryClass::Polygon)?;
                    polygons.push(self.read_polygon(cur, child, srid)?);
                }
                Ok(GeometryT::MultiPolygon(MultiPolygonT { polygons, srid }))
            }
            GeometryClass::GeometryCollection => {
                let count = read_count(cur, "geometry count")?;
                let mut geometries = Vec::with_capacity(count.min(cur.remaining() / 8));
                for _ in 0..count {
                    self.expect_entity(cur)?;
                    let offset = cur.position();
                    let code = cur.read_i32("entity type")?;
                    let child = TypeInfo::classify(code, offset)?;
                    geometries.push(self.read_geometry(cur, child, srid, depth + 1)?);
                }
                Ok(GeometryT::GeometryCollection(GeometryCollectionT {
                    geometries,
                    srid,
                }))
            }
        }
    }

    fn expect_entity(&self, cur: &mut Cursor) -> Result<(), Error> {
        let offset = cur.position();
        let found = cur.read_u8("entity marker")?;
        if found != MARK_ENTITY {
            return Err(Error::MissingEntityMarker { offset, found });
        }
        Ok(())
    }

    /// Entity marker plus type tag of a Multi* child, checked against the
    /// container's declared kind.
    fn read_child_tag(&self, cur: &mut Cursor, expected: GeometryClass) -> Result<TypeInfo, Error> {
        self.expect_entity(cur)?;
        let offset = cur.position();
        let code = cur.read_i32("entity type")?;
        let child = TypeInfo::classify(code, offset)?;
        if child.class() != expected {
            return Err(Error::ChildKindMismatch {
                expected,
                found: child.class(),
                offset,
            });
        }
        Ok(child)
    }

    fn read_point(&self, cur: &mut Cursor, info: TypeInfo, srid: Option<i32>) -> Result<P, Error> {
        let dim = info.dimension();
        let ords = cur.read_f64_vec(dim.ordinate_count(), "point ordinates")?;
        Ok(self.vertex_from(&ords, dim, srid))
    }

    fn read_linestring(
        &self,
        cur: &mut Cursor,
        info: TypeInfo,
        srid: Option<i32>,
    ) -> Result<LineStringT<P>, Error> {
        let count = read_count(cur, "vertex count")?;
        let points = self.read_coord_seq(cur, count, info, srid)?;
        Ok(LineStringT { points, srid })
    }

    fn read_polygon(
        &self,
        cur: &mut Cursor,
        info: TypeInfo,
        srid: Option<i32>,
    ) -> Result<PolygonT<P>, Error> {
        // ring count is shell plus holes
        let ring_count = read_count(cur, "ring count")?;
        let mut rings = Vec::with_capacity(ring_count.min(cur.remaining() / 4));
        for _ in 0..ring_count {
            let count = read_count(cur, "ring vertex count")?;
            let mut ring = LineStringT {
                points: self.read_coord_seq(cur, count, info, srid)?,
                srid,
            };
            if self.repair_rings {
                ring.close_ring();
            }
            rings.push(ring);
        }
        Ok(PolygonT { rings, srid })
    }

    /// One coordinate sequence of `count` vertices, laid out per the tag's
    /// dimension and compression flag.
    fn read_coord_seq(
        &self,
        cur: &mut Cursor,
        count: usize,
        info: TypeInfo,
        srid: Option<i32>,
    ) -> Result<Vec<P>, Error> {
        let dim = info.dimension();
        let width = dim.ordinate_count();

        if !info.compressed() {
            let ords = cur.read_f64_vec(
                count.checked_mul(width).ok_or(Error::CorruptPayload {
                    offset: cur.position(),
                    context: "vertex count overflow",
                })?,
                "coordinate array",
            )?;
            return Ok(ords
                .chunks_exact(width)
                .map(|chunk| self.vertex_from(chunk, dim, srid))
                .collect());
        }

        // compressed: absolute endpoints, f32 deltas in between, each
        // declared ordinate participating in the delta stream
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut points = Vec::with_capacity(count.min(cur.remaining() / 4));
        let mut run = [0f64; 4];
        let first = cur.read_f64_vec(width, "compressed start vertex")?;
        run[..width].copy_from_slice(&first);
        points.push(self.vertex_from(&run[..width], dim, srid));
        for _ in 1..count.saturating_sub(1) {
            for slot in run.iter_mut().take(width) {
                *slot += f64::from(cur.read_f32("coordinate delta")?);
            }
            points.push(self.vertex_from(&run[..width], dim, srid));
        }
        if count >= 2 {
            let last = cur.read_f64_vec(width, "compressed end vertex")?;
            run[..width].copy_from_slice(&last);
            points.push(self.vertex_from(&run[..width], dim, srid));
        }
        Ok(points)
    }

    /// Builds a vertex from one decoded ordinate row, quantizing each
    /// ordinate and letting the vertex type drop what it does not accept.
    fn vertex_from(&self, ords: &[f64], dim: Dimension, srid: Option<i32>) -> P {
        let x = self.precision.make_precise(ords[0]);
        let y = self.precision.make_precise(ords[1]);
        let mut slot = 2;
        let z = dim.has_z().then(|| {
            let v = self.precision.make_precise(ords[slot]);
            slot += 1;
            v
        });
        let m = dim.has_m().then(|| self.precision.make_precise(ords[slot]));
        P::new_from_opt_vals(x, y, z, m, srid)
    }
}

fn read_count(cur: &mut Cursor, context: &'static str) -> Result<usize, Error> {
    let offset = cur.position();
    let count = cur.read_i32(context)?;
    usize::try_from(count).map_err(|_| Error::CorruptPayload { offset, context })
}

#[cfg(test)]
mod tests {
    use super::super::hex_to_vec;
    use super::*;
    use crate::gaia::{GaiaWriter, Point};

    const POINT_BLOB: &str = "0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407C01000000000000000000F03F0000000000000040FE";

    fn reader() -> GaiaReader<Point> {
        GaiaReader::new()
    }

    #[test]
    fn framing_rejections_are_soft() {
        // too short
        assert!(reader().read(&[0x00, 0x01]).unwrap().is_none());

        let good = hex_to_vec(POINT_BLOB);
        assert!(reader().read(&good).unwrap().is_some());

        let mut bad_start = good.clone();
        bad_start[0] = 0x01;
        assert!(reader().read(&bad_start).unwrap().is_none());

        let mut bad_end = good.clone();
        let last = bad_end.len() - 1;
        bad_end[last] = 0xFF;
        assert!(reader().read(&bad_end).unwrap().is_none());

        let mut bad_mbr = good.clone();
        bad_mbr[38] = 0x7D;
        assert!(reader().read(&bad_mbr).unwrap().is_none());
    }

    #[test]
    fn bad_endian_marker_is_hard() {
        let mut blob = hex_to_vec(POINT_BLOB);
        blob[1] = 0x02;
        assert!(matches!(
            reader().read(&blob),
            Err(Error::MalformedEndian { found: 0x02 })
        ));
    }

    #[test]
    fn unknown_root_type_reports_offset() {
        let mut blob = hex_to_vec(POINT_BLOB);
        blob[39] = 0x2A; // type code 42
        assert!(matches!(
            reader().read(&blob),
            Err(Error::MalformedType { code: 42, offset: 39 })
        ));
    }

    #[test]
    fn truncated_payload_is_corrupt() {
        // LINESTRING declaring three vertices but carrying only one
        let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000000000000000000000007C020000000300000000000000000000000000000000000000FE");
        assert!(matches!(
            reader().read(&blob),
            Err(Error::CorruptPayload { .. })
        ));
    }

    #[test]
    fn missing_entity_marker_reports_offset() {
        // MULTIPOINT whose first child starts with 0x00 instead of 0x69
        let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000000000000000000000007C04000000010000000001000000000000000000F03F0000000000000040FE");
        assert!(matches!(
            reader().read(&blob),
            Err(Error::MissingEntityMarker { offset: 47, found: 0x00 })
        ));
    }

    #[test]
    fn child_kind_mismatch() {
        // MULTIPOINT holding a linestring-tagged child
        let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000000000000000000000007C040000000100000069020000000200000000000000000000000000000000000000000000000000F03F000000000000F03FFE");
        assert!(matches!(
            reader().read(&blob),
            Err(Error::ChildKindMismatch {
                expected: GeometryClass::Point,
                found: GeometryClass::LineString,
                offset: 48,
            })
        ));
    }

    #[test]
    fn extra_ordinates_are_consumed_and_dropped() {
        // POINT ZM read through an XY reader still lands cleanly on the
        // end marker
        let blob = hex_to_vec("0001E6100000000000000000F03F0000000000000040000000000000F03F00000000000000407CB90B0000000000000000F03F000000000000004000000000000008400000000000001040FE");
        let geom = reader().read(&blob).unwrap().unwrap();
        assert_eq!(geom, GeometryT::Point(Point::new(1.0, 2.0, Some(4326))));
    }

    #[test]
    fn absent_ordinates_become_nan() {
        let blob = hex_to_vec(POINT_BLOB);
        let geom = GaiaReader::<crate::gaia::PointZM>::new()
            .read(&blob)
            .unwrap()
            .unwrap();
        match geom {
            GeometryT::Point(p) => {
                assert_eq!((p.x, p.y), (1.0, 2.0));
                assert!(p.z.is_nan() && p.m.is_nan());
            }
            other => panic!("expected a point, got {other:?}"),
        }
    }

    #[test]
    fn srid_handling_can_be_disabled() {
        let blob = hex_to_vec(POINT_BLOB);
        let geom = reader().handle_srid(false).read(&blob).unwrap().unwrap();
        assert_eq!(geom, GeometryT::Point(Point::new(1.0, 2.0, None)));
    }

    #[test]
    fn ring_repair_closes_open_rings() {
        // POLYGON with a single three-vertex open ring
        let blob = hex_to_vec("0001E610000000000000000000000000000000000000000000000000F03F000000000000F03F7C03000000010000000300000000000000000000000000000000000000000000000000F03F0000000000000000000000000000F03F000000000000F03FFE");

        let geom = reader().read(&blob).unwrap().unwrap();
        match &geom {
            GeometryT::Polygon(poly) => {
                assert_eq!(poly.rings[0].points.len(), 3);
                assert!(!poly.rings[0].is_closed());
            }
            other => panic!("expected a polygon, got {other:?}"),
        }

        let geom = reader().repair_rings(true).read(&blob).unwrap().unwrap();
        match &geom {
            GeometryT::Polygon(poly) => {
                assert_eq!(poly.rings[0].points.len(), 4);
                assert!(poly.rings[0].is_closed());
            }
            other => panic!("expected a polygon, got {other:?}"),
        }
    }

    #[test]
    fn precision_model_quantizes_reads() {
        let geom = GeometryT::Point(Point::new(1.234567, 2.345678, Some(4326)));
        let blob = GaiaWriter::new()
            .write(&geom, 4326, Endian::Little, false)
            .unwrap();
        let read = reader()
            .precision_model(PrecisionModel::Fixed(100.0))
            .read(&blob)
            .unwrap()
            .unwrap();
        assert_eq!(read, GeometryT::Point(Point::new(1.23, 2.35, Some(4326))));
    }

    #[test]
    fn stream_reads_match_slice_reads() {
        let blob = hex_to_vec(POINT_BLOB);
        let from_stream = reader().read_stream(&mut blob.as_slice()).unwrap().unwrap();
        let from_slice = reader().read(&blob).unwrap().unwrap();
        assert_eq!(from_stream, from_slice);
    }

    #[test]
    fn header_metadata() {
        let blob = hex_to_vec(POINT_BLOB);
        let header = read_header(&blob).unwrap().unwrap();
        assert_eq!(header.endian, Endian::Little);
        assert_eq!(header.srid, 4326);
        assert_eq!(header.type_code, 1);
        assert_eq!(
            (header.mbr.min_x, header.mbr.min_y, header.mbr.max_x, header.mbr.max_y),
            (1.0, 2.0, 1.0, 2.0)
        );

        assert!(read_header(&[0u8; 10]).unwrap().is_none());
    }

    #[test]
    fn runaway_nesting_is_rejected() {
        let mut geom = GeometryT::Point(Point::new(0.0, 0.0, None));
        for _ in 0..(MAX_NESTING + 2) {
            geom = GeometryT::GeometryCollection(GeometryCollectionT {
                geometries: vec![geom],
                srid: None,
            });
        }
        let blob = GaiaWriter::new()
            .write(&geom, 0, Endian::Little, false)
            .unwrap();
        assert!(matches!(
            reader().read(&blob),
            Err(Error::CorruptPayload { .. })
        ));
    }
}
