//! The packet-to-image pipeline.
//! Tokenize a hex dump into payloads, rasterize each payload into a pixel grid, stack the grids and store them.
pub mod utils;
pub mod core;
pub mod tokenizer;
pub mod rasterizer;
pub mod assembler;
pub mod store;
pub mod containers;
