//! Audio buffer decoding and preprocessing.

pub mod preprocess;
