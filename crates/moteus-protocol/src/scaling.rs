//! Unit scaling, saturation and the NaN sentinel.
//!
//! Fixed-point fields carry `value / scale` truncated toward zero and
//! clamped to `[-MAX, MAX]`. The two's-complement minimum of each width is
//! never produced by clamping: it is reserved to mean "not a number".
//! Float fields are sent unscaled and use IEEE NaN directly.

use crate::multiplex::Resolution;

/// Fixed-point integer widths used on the wire.
pub trait Fixed: Copy + PartialEq + std::fmt::Debug {
    /// Reserved NaN sentinel.
    const MIN: Self;
    const MAX: Self;

    /// Truncating conversion from an in-range double.
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;
}

macro_rules! impl_fixed {
    ($($ty:ty),*) => {
        $(
            impl Fixed for $ty {
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;

                fn from_f64(value: f64) -> Self {
                    value as $ty
                }

                fn to_f64(self) -> f64 {
                    f64::from(self)
                }
            }
        )*
    };
}

impl_fixed!(i8, i16, i32);

/// Convert an engineering-unit value into a fixed-point wire integer.
///
/// Non-finite input maps to the sentinel `T::MIN`.
pub fn saturate<T: Fixed>(value: f64, scale: f64) -> T {
    if !value.is_finite() {
        return T::MIN;
    }

    let scaled = value / scale;
    let max = T::MAX.to_f64();
    if scaled < -max {
        return T::from_f64(-max);
    }
    if scaled > max {
        return T::MAX;
    }
    T::from_f64(scaled)
}

/// Map a raw wire integer back to a double, turning the sentinel into NaN.
///
/// The result is unscaled; callers multiply by the field's scale.
pub fn nanify<T: Fixed>(raw: T) -> f64 {
    if raw == T::MIN {
        return f64::NAN;
    }
    raw.to_f64()
}

/// Per-resolution scale factors for one physical quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub int8: f64,
    pub int16: f64,
    pub int32: f64,
}

impl Scale {
    pub const fn new(int8: f64, int16: f64, int32: f64) -> Self {
        Self { int8, int16, int32 }
    }

    /// The scale used at `resolution`. Floats are always unscaled.
    pub fn for_resolution(&self, resolution: Resolution) -> Option<f64> {
        match resolution {
            Resolution::Int8 => Some(self.int8),
            Resolution::Int16 => Some(self.int16),
            Resolution::Int32 => Some(self.int32),
            Resolution::Float => Some(1.0),
            Resolution::Ignore => None,
        }
    }
}

// These must match the controller firmware exactly.

/// Revolutions.
pub const POSITION: Scale = Scale::new(0.01, 0.0001, 0.00001);
/// Revolutions per second.
pub const VELOCITY: Scale = Scale::new(0.1, 0.00025, 0.00001);
/// Newton meters.
pub const TORQUE: Scale = Scale::new(0.5, 0.01, 0.001);
/// Unitless duty cycle; also used for the kp/kd scale factors.
pub const PWM: Scale = Scale::new(1.0 / 127.0, 1.0 / 32767.0, 1.0 / 2147483647.0);
/// Volts.
pub const VOLTAGE: Scale = Scale::new(0.5, 0.1, 0.001);
/// Degrees Celsius.
pub const TEMPERATURE: Scale = Scale::new(1.0, 0.1, 0.001);
/// Seconds.
pub const TIME: Scale = Scale::new(0.01, 0.001, 0.000001);
/// Amperes.
pub const CURRENT: Scale = Scale::new(1.0, 0.1, 0.001);
/// Plain integers such as mode and fault codes.
pub const INT: Scale = Scale::new(1.0, 1.0, 1.0);

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn non_finite_maps_to_sentinel() {
        assert_eq!(saturate::<i8>(f64::NAN, 1.0), i8::MIN);
        assert_eq!(saturate::<i16>(f64::INFINITY, 1.0), i16::MIN);
        assert_eq!(saturate::<i32>(f64::NEG_INFINITY, 1.0), i32::MIN);
    }

    #[test]
    fn clamps_to_symmetric_range() {
        assert_eq!(saturate::<i8>(1000.0, 1.0), 127);
        assert_eq!(saturate::<i8>(-1000.0, 1.0), -127);
        assert_eq!(saturate::<i16>(-1.0e9, 1.0), -32767);
        assert_eq!(saturate::<i32>(1.0e12, 1.0), i32::MAX);
        assert_eq!(saturate::<i32>(-1.0e12, 1.0), -i32::MAX);
    }

    #[test]
    fn truncates_toward_zero() {
        assert_eq!(saturate::<i16>(0.12345, POSITION.int16), 1234);
        assert_eq!(saturate::<i16>(-0.12345, POSITION.int16), -1234);
        assert_eq!(saturate::<i8>(0.9, 1.0), 0);
    }

    #[test]
    fn sentinel_becomes_nan() {
        assert!(nanify(i8::MIN).is_nan());
        assert!(nanify(i16::MIN).is_nan());
        assert!(nanify(i32::MIN).is_nan());
        assert_eq!(nanify(-127i8), -127.0);
        assert_eq!(nanify(42i32), 42.0);
    }

    #[test]
    fn float_resolution_is_unscaled() {
        assert_eq!(POSITION.for_resolution(Resolution::Float), Some(1.0));
        assert_eq!(TORQUE.for_resolution(Resolution::Int8), Some(0.5));
        assert_eq!(TORQUE.for_resolution(Resolution::Ignore), None);
    }

    proptest! {
        #[test]
        fn saturation_never_wraps(value in -1.0e15f64..1.0e15) {
            let raw = saturate::<i16>(value, 1.0);
            prop_assert_ne!(raw, i16::MIN);
            if value > f64::from(i16::MAX) {
                prop_assert_eq!(raw, i16::MAX);
            }
            if value < -f64::from(i16::MAX) {
                prop_assert_eq!(raw, -i16::MAX);
            }
        }

        #[test]
        fn fixed_point_roundtrip_within_one_lsb(unit in -1.0f64..1.0) {
            for scale in [POSITION, VELOCITY, TORQUE, PWM, VOLTAGE, TEMPERATURE, TIME, CURRENT] {
                let value = unit * 127.0 * scale.int8;
                let decoded = nanify(saturate::<i8>(value, scale.int8)) * scale.int8;
                prop_assert!((decoded - value).abs() <= scale.int8 * (1.0 + 1e-9) + 1e-12);

                let value = unit * 32767.0 * scale.int16;
                let decoded = nanify(saturate::<i16>(value, scale.int16)) * scale.int16;
                prop_assert!((decoded - value).abs() <= scale.int16 * (1.0 + 1e-9) + 1e-12);

                let value = unit * 2147483647.0 * scale.int32;
                let decoded = nanify(saturate::<i32>(value, scale.int32)) * scale.int32;
                prop_assert!((decoded - value).abs() <= scale.int32 * (1.0 + 1e-6) + 1e-12);
            }
        }
    }
}
