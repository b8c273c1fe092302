//! # pulsejet-codec
//!
//! Signal path for the pulsejet lossy audio codec: windowed MDCT analysis
//! with long/short window switching, per-band normalization and scalar
//! quantization driven by an exhaustive rate-distortion search, predictive
//! band-energy coding, and the matching decoder with deterministic noise
//! fill.
//!
//! The encoded container is deliberately simple and redundant; it is meant
//! to be squeezed by an external general-purpose compressor, and the rate
//! controller estimates that compressor's cost rather than the raw stream
//! size.
//!
//! ## Example
//!
//! ```no_run
//! use pulsejet_codec::{Decoder, Encoder, EncoderConfig};
//!
//! let samples = vec![0.0f32; 1024];
//! let encoded = Encoder::new(EncoderConfig::default()).encode(&samples);
//! let decoded = Decoder::new().decode(&encoded.data).unwrap();
//! assert_eq!(decoded.len(), 1024);
//! ```

pub mod decoder;
pub mod encoder;
mod entropy;
pub mod mdct;
mod quantize;
pub mod window;

pub use decoder::Decoder;
pub use encoder::{EncodedSample, Encoder, EncoderConfig};
