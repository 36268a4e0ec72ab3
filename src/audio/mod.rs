//! Audio input: decoding and resampling to the analysis signal

pub mod decoder;

pub use decoder::decode;
