//! Bidirectional KML 2.2 codec for venue collections.
//!
//! Decoding tolerates the several legacy field-naming conventions found in
//! real documents (typed `<Data>` extension pairs, flatter `<SimpleData>`
//! schema blocks, and links buried in description HTML) and normalizes them
//! into one data model. Encoding produces one folder per category with
//! CDATA-wrapped text blocks.

pub mod decode;
pub mod encode;
pub mod error;
mod fields;
mod sanitize;

pub use decode::parse_kml;
pub use encode::write_kml;
pub use error::KmlError;
