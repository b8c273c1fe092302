//! Injected math primitives.
//!
//! The decoder is built for size-constrained environments where the usual
//! libm entry points may not be available and are instead implemented by
//! hand, often with reduced accuracy. The codec therefore consumes its four
//! transcendental/root operations through a capability trait supplied by
//! the caller rather than calling the standard library directly.

use std::f32::consts::FRAC_PI_2;
use std::f64::consts::TAU;

/// The four unary float operations the codec consumes.
///
/// The decoder tolerates reduced-accuracy implementations; the encoder
/// should normally be paired with [`StdMath`] so that rate decisions are
/// made against accurate spectra. Implementations must be deterministic:
/// the same input yields the same output within one process.
pub trait MathOps {
    /// Cosine of `x` (radians).
    fn cos(&self, x: f32) -> f32;
    /// Sine of `x` (radians).
    fn sin(&self, x: f32) -> f32;
    /// `2^x`.
    fn exp2(&self, x: f32) -> f32;
    /// Non-negative square root.
    fn sqrt(&self, x: f32) -> f32;
}

/// Accurate reference implementation backed by the standard library.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdMath;

impl MathOps for StdMath {
    #[inline]
    fn cos(&self, x: f32) -> f32 {
        x.cos()
    }

    #[inline]
    fn sin(&self, x: f32) -> f32 {
        x.sin()
    }

    #[inline]
    fn exp2(&self, x: f32) -> f32 {
        x.exp2()
    }

    #[inline]
    fn sqrt(&self, x: f32) -> f32 {
        x.sqrt()
    }
}

const COS_TABLE_SIZE: usize = 1024;

/// Speed-optimized implementation using an interpolated cosine table.
///
/// The table is built once at construction. Sine is derived from the same
/// table via a quarter-turn phase shift; `exp2` and `sqrt` delegate to the
/// standard library. Accuracy is a few units in the fifth decimal place,
/// well within what the decoder tolerates.
pub struct TableMath {
    table: Vec<f64>,
}

impl TableMath {
    /// Build the lookup table.
    #[must_use]
    pub fn new() -> Self {
        let mut table = Vec::with_capacity(COS_TABLE_SIZE + 1);
        for i in 0..=COS_TABLE_SIZE {
            table.push((i as f64 * TAU / COS_TABLE_SIZE as f64).cos());
        }
        Self { table }
    }
}

impl Default for TableMath {
    fn default() -> Self {
        Self::new()
    }
}

impl MathOps for TableMath {
    fn cos(&self, x: f32) -> f32 {
        // Cosine is even, so fold negative arguments first.
        let phase = f64::from(x.abs()) / TAU;
        let t = (phase - phase.floor()) * COS_TABLE_SIZE as f64;
        let index = t as usize;
        let fract = t - index as f64;
        let left = self.table[index];
        let right = self.table[index + 1];
        (left + (right - left) * fract) as f32
    }

    fn sin(&self, x: f32) -> f32 {
        self.cos(x - FRAC_PI_2)
    }

    #[inline]
    fn exp2(&self, x: f32) -> f32 {
        x.exp2()
    }

    #[inline]
    fn sqrt(&self, x: f32) -> f32 {
        x.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_std_math_matches_intrinsics() {
        let math = StdMath;
        assert_eq!(math.cos(0.0), 1.0);
        assert_eq!(math.exp2(3.0), 8.0);
        assert_eq!(math.sqrt(9.0), 3.0);
        assert!(math.sin(PI / 2.0) > 0.999_999);
    }

    #[test]
    fn test_table_math_tracks_std_cos() {
        let table = TableMath::new();
        let std = StdMath;
        let mut x = -25.0f32;
        while x < 25.0 {
            let err = (table.cos(x) - std.cos(x)).abs();
            assert!(err < 1e-4, "cos({x}) error {err}");
            x += 0.037;
        }
    }

    #[test]
    fn test_table_math_sin_phase_shift() {
        let table = TableMath::new();
        assert!(table.sin(0.0).abs() < 1e-5);
        assert!((table.sin(PI / 2.0) - 1.0).abs() < 1e-5);
        assert!((table.sin(PI / 6.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_table_math_delegates_exp2_sqrt() {
        let table = TableMath::new();
        assert_eq!(table.exp2(-20.0), (-20.0f32).exp2());
        assert_eq!(table.sqrt(2.0), 2.0f32.sqrt());
    }
}
