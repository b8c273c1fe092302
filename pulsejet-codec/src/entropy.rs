//! Order-0 entropy estimation for candidate symbol streams.
//!
//! The encoder never entropy-codes anything itself; the container is meant
//! to be squeezed by an external general-purpose compressor. The rate
//! controller therefore only needs a cheap proxy for what that compressor
//! will spend, and a symbol-frequency model is good enough for steering the
//! scaling-factor search.

/// Byte-symbol frequency bag with an order-0 bit-cost estimate.
///
/// Band-energy residuals and bin quanta get independent bags; sharing one
/// across the two streams would skew both estimates.
#[derive(Clone)]
pub struct SymbolCounts {
    freqs: [u32; 256],
    total: u32,
}

impl SymbolCounts {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self {
            freqs: [0; 256],
            total: 0,
        }
    }

    /// Count one symbol occurrence.
    #[inline]
    pub fn record(&mut self, symbol: u8) {
        self.freqs[symbol as usize] += 1;
        self.total += 1;
    }

    /// Order-0 entropy of the recorded symbols, in bits:
    /// `H = sum_i f_i * (-log2(f_i / N))`.
    ///
    /// An empty bag costs zero bits, as does a bag holding a single
    /// repeated symbol.
    pub fn bits_estimate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = f64::from(self.total);
        self.freqs
            .iter()
            .filter(|&&freq| freq != 0)
            .map(|&freq| {
                let freq = f64::from(freq);
                -(freq / total).log2() * freq
            })
            .sum()
    }
}

impl Default for SymbolCounts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stream_is_free() {
        assert_eq!(SymbolCounts::new().bits_estimate(), 0.0);
    }

    #[test]
    fn test_single_symbol_is_free() {
        let mut counts = SymbolCounts::new();
        for _ in 0..100 {
            counts.record(42);
        }
        assert_eq!(counts.bits_estimate(), 0.0);
    }

    #[test]
    fn test_uniform_pair_costs_one_bit_per_symbol() {
        let mut counts = SymbolCounts::new();
        for _ in 0..64 {
            counts.record(0);
            counts.record(255);
        }
        assert!((counts.bits_estimate() - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_skewed_stream_costs_less_than_uniform() {
        let mut skewed = SymbolCounts::new();
        let mut uniform = SymbolCounts::new();
        for i in 0..128u32 {
            skewed.record(if i < 120 { 0 } else { 1 });
            uniform.record((i % 2) as u8);
        }
        assert!(skewed.bits_estimate() < uniform.bits_estimate());
    }
}
