//! Core building blocks of the aging pipeline: parameters, blend masks, and
//! the crop / canvas / tile-blend / composite processing stages. These are
//! primitives consumed by the high-level `api` module.
pub mod masks;
pub mod params;
pub mod processing;
