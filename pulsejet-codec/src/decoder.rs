//! Decoder driver: stream walking, noise fill, band reconstruction, and
//! overlap-add synthesis.

use pulsejet_core::{
    MathOps, Result, SampleHeader, StdMath, WindowMode, BAND_TO_NUM_BINS, FRAME_SIZE, HEADER_SIZE,
    LONG_WINDOW_SIZE, NUM_BANDS, NUM_TOTAL_BINS,
};
use tracing::debug;

use crate::mdct::Mdct;
use crate::quantize::{dequantize_band_energy, l2_norm};
use crate::window::{mdct_window, subframe_layout};

/// Bands with fewer than this fraction of nonzero bins get noise fill.
const NOISE_FILL_THRESHOLD: f32 = 0.1;

/// Numerical Recipes LCG parameters.
const LCG_MUL: u32 = 1664525;
const LCG_ADD: u32 = 1013904223;

/// Deterministic noise source for sparse-band fill.
///
/// State starts at zero on every decode call, so identical inputs always
/// produce identical noise contributions.
struct NoiseLcg {
    state: u32,
}

impl NoiseLcg {
    fn new() -> Self {
        Self { state: 0 }
    }

    /// Next noise sample in roughly [-1, 1].
    fn next(&mut self) -> f32 {
        let sample = f32::from((self.state >> 16) as u8 as i8) / 127.0;
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        sample
    }
}

/// pulsejet decoder.
pub struct Decoder<M = StdMath> {
    math: M,
}

impl Decoder<StdMath> {
    /// Create a decoder with the accurate math implementation.
    pub fn new() -> Self {
        Self::with_math(StdMath)
    }
}

impl Default for Decoder<StdMath> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MathOps> Decoder<M> {
    /// Create a decoder with a caller-supplied math implementation.
    /// Reduced-accuracy implementations are tolerated.
    pub fn with_math(math: M) -> Self {
        Self { math }
    }

    /// Decode an encoded sample into a freshly allocated buffer of
    /// normalized samples.
    ///
    /// Only the header is validated, before any decode work begins. The
    /// decode loop itself performs no bounds or integrity checks on the
    /// payload: the caller must supply the full container, and an
    /// undersized or malformed payload produces garbage output or an
    /// out-of-range panic rather than an error.
    pub fn decode(&self, input: &[u8]) -> Result<Vec<f32>> {
        let header = SampleHeader::read(input)?;
        let num_output_samples = header.num_frames as usize * FRAME_SIZE;

        // One frame beyond the output length was coded; it lands in the
        // discarded tail padding.
        let num_frames = header.num_frames as usize + 1;
        debug!(num_frames = header.num_frames, "decoding sample stream");

        let window_mode_stream = &input[HEADER_SIZE..HEADER_SIZE + num_frames];
        let bin_q_base = HEADER_SIZE + num_frames;
        let bin_q_stream = &input[bin_q_base..bin_q_base + num_frames * NUM_TOTAL_BINS];
        let band_energy_stream = &input[bin_q_base + num_frames * NUM_TOTAL_BINS..];

        let num_padded_samples = num_output_samples + FRAME_SIZE * 2;
        let mut padded = vec![0.0f32; num_padded_samples];

        let mut lcg = NoiseLcg::new();
        let mut predictions = [0u8; NUM_BANDS];
        let mut bin_q_cursor = 0usize;
        let mut band_energy_cursor = 0usize;
        let mut synth = vec![0.0f32; LONG_WINDOW_SIZE];

        for frame_index in 0..num_frames {
            let window_mode = WindowMode::from_tag(window_mode_stream[frame_index]);
            let (num_subframes, subframe_window_offset, subframe_window_size) =
                subframe_layout(window_mode);
            let subframe_size = subframe_window_size / 2;
            let mdct = Mdct::new(subframe_window_size);

            for subframe_index in 0..num_subframes {
                let mut window_bins = [0.0f32; FRAME_SIZE];

                let mut band_start = 0usize;
                for band_index in 0..NUM_BANDS {
                    let num_bins = BAND_TO_NUM_BINS[band_index] as usize / num_subframes;
                    let band_bins = &mut window_bins[band_start..band_start + num_bins];

                    let mut num_nonzero_bins = 0usize;
                    for bin in band_bins.iter_mut() {
                        let quantum = bin_q_stream[bin_q_cursor] as i8;
                        bin_q_cursor += 1;
                        if quantum != 0 {
                            num_nonzero_bins += 1;
                        }
                        *bin = f32::from(quantum);
                    }

                    // A significantly sparse band sounds like isolated
                    // spikes; replace the gap with (nearly) spectrally
                    // flat noise instead.
                    let bin_fill = num_nonzero_bins as f32 / num_bins as f32;
                    if bin_fill < NOISE_FILL_THRESHOLD {
                        let sparsity = (NOISE_FILL_THRESHOLD - bin_fill) / NOISE_FILL_THRESHOLD;
                        let noise_fill_gain = sparsity * sparsity;
                        for bin in band_bins.iter_mut() {
                            *bin += lcg.next() * noise_fill_gain;
                        }
                    }

                    let residual = band_energy_stream[band_energy_cursor];
                    band_energy_cursor += 1;
                    let quantized = predictions[band_index].wrapping_add(residual);
                    predictions[band_index] = quantized;
                    let band_energy = dequantize_band_energy(&self.math, quantized, num_bins);

                    // Normalize the decoded bins, then restore the band's
                    // transmitted energy.
                    let bin_energy = l2_norm(&self.math, band_bins);
                    let bin_scale = band_energy / bin_energy;
                    for bin in band_bins.iter_mut() {
                        *bin *= bin_scale;
                    }

                    band_start += num_bins;
                }

                mdct.inverse(
                    &self.math,
                    &window_bins[..subframe_size],
                    &mut synth[..subframe_window_size],
                );

                let frame_offset = frame_index * FRAME_SIZE;
                let window_offset = subframe_window_offset + subframe_index * subframe_size;
                for (n, &sample) in synth[..subframe_window_size].iter().enumerate() {
                    padded[frame_offset + window_offset + n] +=
                        sample * mdct_window(&self.math, n, subframe_window_size, window_mode);
                }
            }
        }

        Ok(padded[FRAME_SIZE..FRAME_SIZE + num_output_samples].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsejet_core::Error;

    #[test]
    fn test_noise_lcg_known_sequence() {
        let mut lcg = NoiseLcg::new();
        // State 0 yields silence, then 0x3C6EF35F >> 16 = 0x3C6E, whose low
        // byte 0x6E is 110.
        assert_eq!(lcg.next(), 0.0);
        assert_eq!(lcg.next(), 110.0 / 127.0);
        assert_eq!(lcg.state, 0x3C6E_F35Fu32.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD));
    }

    #[test]
    fn test_noise_lcg_resets_per_decode() {
        let mut first = NoiseLcg::new();
        let mut second = NoiseLcg::new();
        for _ in 0..64 {
            assert_eq!(first.next(), second.next());
        }
    }

    #[test]
    fn test_decode_rejects_foreign_tag() {
        let decoder = Decoder::new();
        let err = decoder.decode(b"OggS\x00\x00\x01\x00\x00\x00").unwrap_err();
        assert!(matches!(err, Error::NotPulsejet));
    }

    #[test]
    fn test_decode_rejects_newer_major() {
        let decoder = Decoder::new();
        let err = decoder.decode(b"PLSJ\x01\x00\x00\x00\x00\x00").unwrap_err();
        assert!(matches!(err, Error::IncompatibleVersion { sample: 1, .. }));
    }
}
