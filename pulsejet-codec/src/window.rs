//! MDCT analysis/synthesis envelope.
//!
//! All four window modes are built from a Vorbis-style sine-of-sine window.
//! Start and Stop are piecewise: one long slope, a flat unity region, and a
//! short slope placed where the neighbouring short windows will land, so
//! overlap-add reconstruction stays exact across a transition. Encoder and
//! decoder must evaluate these bit-identically (modulo the injected `sin`).

use std::f32::consts::{FRAC_PI_2, PI};

use pulsejet_core::{MathOps, WindowMode, LONG_WINDOW_SIZE, NUM_SHORT_WINDOWS_PER_FRAME, SHORT_WINDOW_SIZE};

fn vorbis_window<M: MathOps>(math: &M, n_plus_half: f32, size: usize) -> f32 {
    let sine_window = math.sin(PI / size as f32 * n_plus_half);
    math.sin(FRAC_PI_2 * sine_window * sine_window)
}

/// Window envelope value at position `n` of an analysis window of the given
/// size and mode.
pub fn mdct_window<M: MathOps>(math: &M, n: usize, size: usize, mode: WindowMode) -> f32 {
    let n_plus_half = n as f32 + 0.5;
    match mode {
        WindowMode::Start => {
            let short_window_offset = LONG_WINDOW_SIZE * 3 / 4 - SHORT_WINDOW_SIZE / 4;
            if n >= short_window_offset + SHORT_WINDOW_SIZE / 2 {
                return 0.0;
            } else if n >= short_window_offset {
                return 1.0
                    - vorbis_window(
                        math,
                        n_plus_half - short_window_offset as f32,
                        SHORT_WINDOW_SIZE,
                    );
            } else if n >= LONG_WINDOW_SIZE / 2 {
                return 1.0;
            }
        }
        WindowMode::Stop => {
            let short_window_offset = LONG_WINDOW_SIZE / 4 - SHORT_WINDOW_SIZE / 4;
            if n < short_window_offset {
                return 0.0;
            } else if n < short_window_offset + SHORT_WINDOW_SIZE / 2 {
                return vorbis_window(
                    math,
                    n_plus_half - short_window_offset as f32,
                    SHORT_WINDOW_SIZE,
                );
            } else if n < LONG_WINDOW_SIZE / 2 {
                return 1.0;
            }
        }
        WindowMode::Long | WindowMode::Short => {}
    }
    vorbis_window(math, n_plus_half, size)
}

/// Subframe layout implied by a window mode: subframe count, window offset
/// within the frame, and analysis window size.
pub(crate) fn subframe_layout(mode: WindowMode) -> (usize, usize, usize) {
    if mode == WindowMode::Short {
        (
            NUM_SHORT_WINDOWS_PER_FRAME,
            LONG_WINDOW_SIZE / 4 - SHORT_WINDOW_SIZE / 4,
            SHORT_WINDOW_SIZE,
        )
    } else {
        (1, 0, LONG_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsejet_core::StdMath;

    #[test]
    fn test_long_window_is_symmetric() {
        let math = StdMath;
        for n in 0..LONG_WINDOW_SIZE / 2 {
            let left = mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Long);
            let right = mdct_window(&math, LONG_WINDOW_SIZE - 1 - n, LONG_WINDOW_SIZE, WindowMode::Long);
            assert!((left - right).abs() < 1e-6, "asymmetry at {n}");
        }
    }

    #[test]
    fn test_long_window_rises_to_unity() {
        let math = StdMath;
        assert!(mdct_window(&math, 0, LONG_WINDOW_SIZE, WindowMode::Long) < 1e-5);
        let mid = mdct_window(&math, LONG_WINDOW_SIZE / 2, LONG_WINDOW_SIZE, WindowMode::Long);
        assert!(mid > 0.999);
    }

    #[test]
    fn test_start_window_regions() {
        let math = StdMath;
        let off = LONG_WINDOW_SIZE * 3 / 4 - SHORT_WINDOW_SIZE / 4;

        // First half matches the plain long window.
        for n in [0, 100, LONG_WINDOW_SIZE / 2 - 1] {
            let start = mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Start);
            let long = mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Long);
            assert_eq!(start, long);
        }
        // Flat unity region before the short slope.
        assert_eq!(mdct_window(&math, LONG_WINDOW_SIZE / 2, LONG_WINDOW_SIZE, WindowMode::Start), 1.0);
        assert_eq!(mdct_window(&math, off - 1, LONG_WINDOW_SIZE, WindowMode::Start), 1.0);
        // Zero after the short slope finishes.
        for n in [off + SHORT_WINDOW_SIZE / 2, LONG_WINDOW_SIZE - 1] {
            assert_eq!(mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Start), 0.0);
        }
    }

    #[test]
    fn test_stop_window_regions() {
        let math = StdMath;
        let off = LONG_WINDOW_SIZE / 4 - SHORT_WINDOW_SIZE / 4;

        for n in [0, off - 1] {
            assert_eq!(mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Stop), 0.0);
        }
        assert_eq!(
            mdct_window(&math, off + SHORT_WINDOW_SIZE / 2, LONG_WINDOW_SIZE, WindowMode::Stop),
            1.0
        );
        // Second half matches the plain long window.
        for n in [LONG_WINDOW_SIZE / 2, LONG_WINDOW_SIZE - 1] {
            let stop = mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Stop);
            let long = mdct_window(&math, n, LONG_WINDOW_SIZE, WindowMode::Long);
            assert_eq!(stop, long);
        }
    }

    #[test]
    fn test_start_and_stop_slopes_are_complementary() {
        // The Start down-slope and the Stop up-slope sample the same short
        // vorbis window, so the two bridge halves sum to one.
        let math = StdMath;
        let start_off = LONG_WINDOW_SIZE * 3 / 4 - SHORT_WINDOW_SIZE / 4;
        let stop_off = LONG_WINDOW_SIZE / 4 - SHORT_WINDOW_SIZE / 4;
        for i in 0..SHORT_WINDOW_SIZE / 2 {
            let down = mdct_window(&math, start_off + i, LONG_WINDOW_SIZE, WindowMode::Start);
            let up = mdct_window(&math, stop_off + i, LONG_WINDOW_SIZE, WindowMode::Stop);
            assert!((down + up - 1.0).abs() < 1e-6, "slope mismatch at {i}");
        }
    }

    #[test]
    fn test_subframe_layout() {
        assert_eq!(subframe_layout(WindowMode::Long), (1, 0, LONG_WINDOW_SIZE));
        assert_eq!(subframe_layout(WindowMode::Start), (1, 0, LONG_WINDOW_SIZE));
        assert_eq!(subframe_layout(WindowMode::Stop), (1, 0, LONG_WINDOW_SIZE));
        assert_eq!(
            subframe_layout(WindowMode::Short),
            (8, 448, SHORT_WINDOW_SIZE)
        );
    }
}
