//! sniff2img converts `tcpdump -X` style hex dumps into stacked packet images for
//! intrusion-detection models.
pub mod config;
pub mod error;
pub mod transcoder;

pub use config::{ImageConfig, MalformedPolicy, MarkerRule};
pub use error::{Error, Result};
pub use transcoder::containers::{DatasetArray, HexPayload, PixelGrid};
