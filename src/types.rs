//! Interfaces the codec expects from a host geometry model.
//!
//! The codec ships its own concrete model in [`crate::gaia`], but every
//! coordinate access goes through these traits so the reader and writer
//! stay indifferent to how a vertex stores its ordinates.

/// Common behaviour of a single vertex, whatever its dimensionality.
///
/// `opt_z` and `opt_m` default to `None`; a vertex type only overrides the
/// ordinates it actually carries.
pub trait Point {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn opt_z(&self) -> Option<f64> {
        None
    }
    fn opt_m(&self) -> Option<f64> {
        None
    }
}

/// Quantizer applied to every ordinate the codec stores, on read and on
/// write.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub enum PrecisionModel {
    /// Full f64 precision, the default.
    #[default]
    Floating,
    /// Ordinates are rounded to what an f32 can represent.
    FloatingSingle,
    /// Ordinates are rounded to a fixed grid: `round(v * scale) / scale`.
    Fixed(f64),
}

impl PrecisionModel {
    pub fn make_precise(&self, value: f64) -> f64 {
        match *self {
            PrecisionModel::Floating => value,
            PrecisionModel::FloatingSingle => value as f32 as f64,
            PrecisionModel::Fixed(scale) => (value * scale).round() / scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_is_identity() {
        let pm = PrecisionModel::Floating;
        assert_eq!(pm.make_precise(1.234567890123), 1.234567890123);
    }

    #[test]
    fn floating_single_rounds_to_f32() {
        let pm = PrecisionModel::FloatingSingle;
        assert_eq!(pm.make_precise(1.23456789), 1.23456789f32 as f64);
    }

    #[test]
    fn fixed_rounds_to_grid() {
        let pm = PrecisionModel::Fixed(100.0);
        assert_eq!(pm.make_precise(1.234567), 1.23);
        assert_eq!(pm.make_precise(2.345678), 2.35);
        // .5 rounds away from zero
        assert_eq!(PrecisionModel::Fixed(10.0).make_precise(-1.25), -1.3);
    }
}
