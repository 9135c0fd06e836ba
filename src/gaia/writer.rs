use super::encoding::Sink;
use super::flags::{Dimension, GeometryClass, TypeInfo};
use super::geometry::*;
use super::{Endian, GaiaCoord, MARK_END, MARK_ENTITY, MARK_MBR, MARK_START};
use crate::error::Error;
use crate::types::{Point as _, PrecisionModel};

/// Encodes [`GeometryT`] values as SpatiaLite geometry blobs.
///
/// The ordinate mask trims Z and/or M on the way out regardless of what
/// the vertex type carries; by default everything the vertex stores is
/// written. The envelope in the header is always recomputed from the
/// geometry.
pub struct GaiaWriter {
    handle_ordinates: Dimension,
    precision: PrecisionModel,
}

impl Default for GaiaWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GaiaWriter {
    pub fn new() -> GaiaWriter {
        GaiaWriter {
            handle_ordinates: Dimension::Xyzm,
            precision: PrecisionModel::Floating,
        }
    }

    /// Restricts which ordinates reach the wire.
    pub fn handle_ordinates(mut self, ordinates: Dimension) -> Self {
        self.handle_ordinates = ordinates;
        self
    }

    /// Quantizer applied to every ordinate before it is written.
    pub fn precision_model(mut self, precision: PrecisionModel) -> Self {
        self.precision = precision;
        self
    }

    /// Encodes one geometry.
    ///
    /// Compression only exists for LineString and Polygon coordinate runs;
    /// requesting it for any other root is a no-op, though Multi* and
    /// collection children that are linear still honor the preference.
    pub fn write<P: GaiaCoord>(
        &self,
        geom: &GeometryT<P>,
        srid: i32,
        endian: Endian,
        use_compression: bool,
    ) -> Result<Vec<u8>, Error> {
        let dim = P::dimension().intersect(self.handle_ordinates);
        let class = geom.class();
        let compressed = use_compression && class.supports_compression();
        let root = TypeInfo::new(class, dim, compressed)?;
        let mbr = geom.envelope();

        let mut sink = Sink::with_capacity(64, endian);
        sink.write_u8(MARK_START);
        sink.write_u8(endian.marker());
        sink.write_i32(srid);
        if mbr.is_null() {
            for _ in 0..4 {
                sink.write_f64(0.0);
            }
        } else {
            sink.write_f64(mbr.min_x);
            sink.write_f64(mbr.min_y);
            sink.write_f64(mbr.max_x);
            sink.write_f64(mbr.max_y);
        }
        sink.write_u8(MARK_MBR);
        sink.write_i32(root.code());
        self.write_geometry(&mut sink, geom, dim, use_compression)?;
        sink.write_u8(MARK_END);
        Ok(sink.into_bytes())
    }

    fn write_geometry<P: GaiaCoord>(
        &self,
        sink: &mut Sink,
        geom: &GeometryT<P>,
        dim: Dimension,
        compression: bool,
    ) -> Result<(), Error> {
        match geom {
            GeometryT::Point(p) => {
                self.write_vertex(sink, p, dim);
                Ok(())
            }
            GeometryT::LineString(line) => {
                self.write_coord_seq(sink, &line.points, dim, compression);
                Ok(())
            }
            GeometryT::Polygon(poly) => {
                sink.write_i32(poly.rings.len() as i32);
                for ring in &poly.rings {
                    self.write_coord_seq(sink, &ring.points, dim, compression);
                }
                Ok(())
            }
            GeometryT::MultiPoint(mp) => {
                sink.write_i32(mp.points.len() as i32);
                let child = TypeInfo::new(GeometryClass::Point, dim, false)?;
                for p in &mp.points {
                    sink.write_u8(MARK_ENTITY);
                    sink.write_i32(child.code());
                    self.write_vertex(sink, p, dim);
                }
                Ok(())
            }
            GeometryT::MultiLineString(mls) => {
                sink.write_i32(mls.lines.len() as i32);
                // children inherit the container's compression preference
                let child = TypeInfo::new(GeometryClass::LineString, dim, compression)?;
                for line in &mls.lines {
                    sink.write_u8(MARK_ENTITY);
                    sink.write_i32(child.code());
                    self.write_coord_seq(sink, &line.points, dim, compression);
                }
                Ok(())
            }
            GeometryT::MultiPolygon(mpoly) => {
                sink.write_i32(mpoly.polygons.len() as i32);
                let child = TypeInfo::new(GeometryClass::Polygon, dim, compression)?;
                for poly in &mpoly.polygons {
                    sink.write_u8(MARK_ENTITY);
                    sink.write_i32(child.code());
                    sink.write_i32(poly.rings.len() as i32);
                    for ring in &poly.rings {
                        self.write_coord_seq(sink, &ring.points, dim, compression);
                    }
                }
                Ok(())
            }
            GeometryT::GeometryCollection(gc) => {
                sink.write_i32(gc.geometries.len() as i32);
                for child in &gc.geometries {
                    sink.write_u8(MARK_ENTITY);
                    // each child picks its own compression
                    let class = child.class();
                    let compressed = compression && class.supports_compression();
                    sink.write_i32(TypeInfo::new(class, dim, compressed)?.code());
                    self.write_geometry(sink, child, dim, compression)?;
                }
                Ok(())
            }
        }
    }

    fn write_coord_seq<P: GaiaCoord>(
        &self,
        sink: &mut Sink,
        points: &[P],
        dim: Dimension,
        compressed: bool,
    ) {
        sink.write_i32(points.len() as i32);
        if !compressed {
            for p in points {
                self.write_vertex(sink, p, dim);
            }
            return;
        }

        // absolute endpoints, f32 deltas for the interior; a closed ring
        // therefore keeps byte-identical first and last vertices
        if points.is_empty() {
            return;
        }
        self.write_vertex(sink, &points[0], dim);
        if points.len() == 1 {
            return;
        }
        let mut prev = self.ordinates(&points[0], dim);
        for p in &points[1..points.len() - 1] {
            let cur = self.ordinates(p, dim);
            for (ord, last) in cur.iter().zip(prev.iter()) {
                sink.write_f32((ord - last) as f32);
            }
            prev = cur;
        }
        self.write_vertex(sink, &points[points.len() - 1], dim);
    }

    fn write_vertex<P: GaiaCoord>(&self, sink: &mut Sink, p: &P, dim: Dimension) {
        for ord in self.ordinates(p, dim) {
            sink.write_f64(ord);
        }
    }

    /// Quantized ordinate row of a vertex, trimmed to the output model.
    fn ordinates<P: GaiaCoord>(&self, p: &P, dim: Dimension) -> Vec<f64> {
        let mut ords = Vec::with_capacity(dim.ordinate_count());
        ords.push(self.precision.make_precise(p.x()));
        ords.push(self.precision.make_precise(p.y()));
        if dim.has_z() {
            ords.push(
                self.precision
                    .make_precise(p.opt_z().unwrap_or(f64::NAN)),
            );
        }
        if dim.has_m() {
            ords.push(
                self.precision
                    .make_precise(p.opt_m().unwrap_or(f64::NAN)),
            );
        }
        ords
    }
}
