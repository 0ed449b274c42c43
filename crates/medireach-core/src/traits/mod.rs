//! Core traits defined in `medireach-core` and implemented by other crates.

pub mod geocoder;

pub use geocoder::Geocoder;
