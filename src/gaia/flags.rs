//! Geometry type code algebra.
//!
//! A SpatiaLite type code is additive: a base kind 1..=7, plus 1000 for Z,
//! 2000 for M, 3000 for both, plus 1000000 when the coordinate payload is
//! delta-compressed. Every entity tag in a blob goes through
//! [`TypeInfo::classify`] before anything else is decoded.

use crate::error::Error;

const Z_OFFSET: i32 = 1000;
const M_OFFSET: i32 = 2000;
const ZM_OFFSET: i32 = 3000;
const COMPRESSED_OFFSET: i32 = 1_000_000;

/// The seven base geometry kinds, numbered as on the wire.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum GeometryClass {
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
}

impl GeometryClass {
    pub fn from_base_code(code: i32) -> Option<GeometryClass> {
        match code {
            1 => Some(GeometryClass::Point),
            2 => Some(GeometryClass::LineString),
            3 => Some(GeometryClass::Polygon),
            4 => Some(GeometryClass::MultiPoint),
            5 => Some(GeometryClass::MultiLineString),
            6 => Some(GeometryClass::MultiPolygon),
            7 => Some(GeometryClass::GeometryCollection),
            _ => None,
        }
    }

    pub fn base_code(self) -> i32 {
        self as i32
    }

    /// Delta compression exists only for linear coordinate runs.
    pub fn supports_compression(self) -> bool {
        matches!(self, GeometryClass::LineString | GeometryClass::Polygon)
    }
}

/// Dimensional model of a coordinate sequence. Fully determined by the
/// (has_z, has_m) pair.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Dimension {
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimension {
    pub fn from_flags(has_z: bool, has_m: bool) -> Dimension {
        match (has_z, has_m) {
            (false, false) => Dimension::Xy,
            (true, false) => Dimension::Xyz,
            (false, true) => Dimension::Xym,
            (true, true) => Dimension::Xyzm,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    /// Ordinates per vertex: 2, 3 or 4.
    pub fn ordinate_count(self) -> usize {
        2 + usize::from(self.has_z()) + usize::from(self.has_m())
    }

    /// Ordinates present in both models.
    pub fn intersect(self, other: Dimension) -> Dimension {
        Dimension::from_flags(
            self.has_z() && other.has_z(),
            self.has_m() && other.has_m(),
        )
    }

    fn code_offset(self) -> i32 {
        match self {
            Dimension::Xy => 0,
            Dimension::Xyz => Z_OFFSET,
            Dimension::Xym => M_OFFSET,
            Dimension::Xyzm => ZM_OFFSET,
        }
    }
}

/// A fully classified geometry type tag.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TypeInfo {
    class: GeometryClass,
    dimension: Dimension,
    compressed: bool,
}

impl TypeInfo {
    /// Builds a tag from its components. The inverse of [`classify`].
    ///
    /// [`classify`]: TypeInfo::classify
    pub fn new(
        class: GeometryClass,
        dimension: Dimension,
        compressed: bool,
    ) -> Result<TypeInfo, Error> {
        if compressed && !class.supports_compression() {
            return Err(Error::UnsupportedCombination(class));
        }
        Ok(TypeInfo {
            class,
            dimension,
            compressed,
        })
    }

    /// Decomposes a wire type code. `offset` is the byte position of the
    /// code within the blob, carried into the error on failure.
    pub fn classify(code: i32, offset: usize) -> Result<TypeInfo, Error> {
        let mut rest = code;
        let compressed = rest > COMPRESSED_OFFSET;
        if compressed {
            rest -= COMPRESSED_OFFSET;
        }
        let (has_z, has_m, base) = if rest > ZM_OFFSET {
            (true, true, rest - ZM_OFFSET)
        } else if rest > M_OFFSET {
            (false, true, rest - M_OFFSET)
        } else if rest > Z_OFFSET {
            (true, false, rest - Z_OFFSET)
        } else {
            (false, false, rest)
        };
        let class = GeometryClass::from_base_code(base)
            .ok_or(Error::MalformedType { code, offset })?;
        if compressed && !class.supports_compression() {
            return Err(Error::MalformedType { code, offset });
        }
        Ok(TypeInfo {
            class,
            dimension: Dimension::from_flags(has_z, has_m),
            compressed,
        })
    }

    /// Re-encodes the tag as a wire type code. Deterministic.
    pub fn code(&self) -> i32 {
        let compression = if self.compressed {
            COMPRESSED_OFFSET
        } else {
            0
        };
        self.class.base_code() + self.dimension.code_offset() + compression
    }

    pub fn class(&self) -> GeometryClass {
        self.class
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn has_z(&self) -> bool {
        self.dimension.has_z()
    }

    pub fn has_m(&self) -> bool {
        self.dimension.has_m()
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }
}

/// Strips every decoration from a type code, leaving the base kind.
pub fn base_of(code: i32) -> Result<GeometryClass, Error> {
    TypeInfo::classify(code, 0).map(|info| info.class)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: [GeometryClass; 7] = [
        GeometryClass::Point,
        GeometryClass::LineString,
        GeometryClass::Polygon,
        GeometryClass::MultiPoint,
        GeometryClass::MultiLineString,
        GeometryClass::MultiPolygon,
        GeometryClass::GeometryCollection,
    ];
    const DIMENSIONS: [Dimension; 4] = [
        Dimension::Xy,
        Dimension::Xyz,
        Dimension::Xym,
        Dimension::Xyzm,
    ];

    #[test]
    fn classify_inverts_encode_over_valid_set() {
        for class in CLASSES {
            for dimension in DIMENSIONS {
                for compressed in [false, true] {
                    if compressed && !class.supports_compression() {
                        assert!(matches!(
                            TypeInfo::new(class, dimension, compressed),
                            Err(Error::UnsupportedCombination(c)) if c == class
                        ));
                        continue;
                    }
                    let info = TypeInfo::new(class, dimension, compressed).unwrap();
                    let back = TypeInfo::classify(info.code(), 0).unwrap();
                    assert_eq!(back, info, "code {}", info.code());
                }
            }
        }
    }

    #[test]
    fn known_codes() {
        let info = TypeInfo::classify(2, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::LineString);
        assert_eq!(info.dimension(), Dimension::Xy);
        assert!(!info.compressed());

        let info = TypeInfo::classify(1001, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::Point);
        assert!(info.has_z() && !info.has_m());

        let info = TypeInfo::classify(2003, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::Polygon);
        assert!(!info.has_z() && info.has_m());

        let info = TypeInfo::classify(3007, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::GeometryCollection);
        assert_eq!(info.dimension(), Dimension::Xyzm);

        let info = TypeInfo::classify(1_000_002, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::LineString);
        assert!(info.compressed());

        let info = TypeInfo::classify(1_003_003, 0).unwrap();
        assert_eq!(info.class(), GeometryClass::Polygon);
        assert_eq!(info.dimension(), Dimension::Xyzm);
        assert!(info.compressed());
    }

    #[test]
    fn unknown_codes_fail() {
        for code in [0, 8, -3, 1000, 2000, 3000, 4005, 1_000_000, 999] {
            assert!(
                matches!(
                    TypeInfo::classify(code, 17),
                    Err(Error::MalformedType { offset: 17, .. })
                ),
                "code {code} should not classify"
            );
        }
    }

    #[test]
    fn compressed_flag_is_linear_only() {
        // compressed point / multi / collection tags are malformed
        for base in [1, 4, 5, 6, 7] {
            assert!(matches!(
                TypeInfo::classify(COMPRESSED_OFFSET + base, 0),
                Err(Error::MalformedType { .. })
            ));
        }
    }

    #[test]
    fn base_of_strips_decoration() {
        assert_eq!(base_of(3002).unwrap(), GeometryClass::LineString);
        assert_eq!(base_of(1_002_003).unwrap(), GeometryClass::Polygon);
        assert_eq!(base_of(7).unwrap(), GeometryClass::GeometryCollection);
        assert!(base_of(42).is_err());
    }

    #[test]
    fn dimension_roundtrip() {
        for dimension in DIMENSIONS {
            assert_eq!(
                Dimension::from_flags(dimension.has_z(), dimension.has_m()),
                dimension
            );
        }
        assert_eq!(Dimension::Xyzm.ordinate_count(), 4);
        assert_eq!(Dimension::Xym.ordinate_count(), 3);
        assert_eq!(Dimension::Xy.ordinate_count(), 2);
        assert_eq!(Dimension::Xyzm.intersect(Dimension::Xym), Dimension::Xym);
        assert_eq!(Dimension::Xyz.intersect(Dimension::Xym), Dimension::Xy);
    }
}
