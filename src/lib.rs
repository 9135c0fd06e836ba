//! Read and write geometries in the internal BLOB format of the
//! [SpatiaLite](https://www.gaia-gis.it/gaia-sins/) extension to SQLite.
//!
//! The blob is a framed binary value: start/end sentinels, an endian
//! marker, the SRID, a bounding rectangle, then a recursive geometry
//! payload in any of four dimensional models (XY, XYZ, XYM, XYZM).
//! LineStrings and polygon rings may use SpatiaLite's delta compression,
//! which stores interior vertices as f32 offsets between absolute f64
//! endpoints.
//!
//! ```
//! use spatialite_blob::gaia::{Endian, GaiaReader, GaiaWriter, GeometryT, Point};
//!
//! let geom = GeometryT::Point(Point::new(12.5, 41.9, Some(4326)));
//! let blob = GaiaWriter::new()
//!     .write(&geom, 4326, Endian::Little, false)
//!     .unwrap();
//!
//! let reader = GaiaReader::<Point>::new();
//! assert_eq!(reader.read(&blob).unwrap(), Some(geom));
//! ```

pub mod gaia;
pub mod types;

mod error;
pub use crate::error::Error;
