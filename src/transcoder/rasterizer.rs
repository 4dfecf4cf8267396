//! Turns one hex payload into a fixed-size pixel grid.
use crate::config::{ImageConfig, MalformedPolicy};
use crate::error::{Error, Result};
use super::containers::{HexPayload, PixelGrid};

/// A rasterized packet plus the number of pixels that fell back to padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub grid: PixelGrid,
    pub malformed: usize,
}

#[derive(Clone, Debug)]
pub struct Rasterizer {
    rows: usize,
    cols: usize,
    padding: u8,
    policy: MalformedPolicy,
}

/// Decodes the two hex digits of `payload` starting at hex offset `offset`.
///
/// A lone trailing digit or a non-hex character yields [Error::MalformedPayload].
pub fn decode_pixel(payload: &HexPayload, offset: usize) -> Result<u8> {
    let digits = payload.as_str();
    let start = offset.min(digits.len());
    let end = (offset + 2).min(digits.len());
    let fragment = &digits[start..end];

    let mut byte = [0u8; 1];
    hex::decode_to_slice(fragment, &mut byte).map_err(|_| Error::MalformedPayload {
        packet: payload.index,
        offset,
        fragment: fragment.to_string(),
    })?;

    Ok(byte[0])
}

impl Rasterizer {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            rows: config.rows(),
            cols: config.cols(),
            padding: config.padding_value(),
            policy: config.on_malformed(),
        }
    }

    /// Fills a `rows x cols` grid from `payload`.
    ///
    /// Cell `(r, c)` reads the hex pair at offset `r*cols + 2*c`. Once that offset runs
    /// past the payload the rest of the row keeps the padding value. Digits beyond what
    /// the last row can reach are never looked at.
    pub fn rasterize(&self, payload: &HexPayload) -> Result<Raster> {
        let mut grid = PixelGrid::filled(self.rows, self.cols, self.padding);
        let mut malformed = 0;
        let len = payload.len();

        for r in 0..self.rows {
            for c in 0..self.cols {
                let offset = r * self.cols + 2 * c;
                if offset >= len {
                    break;
                }

                match decode_pixel(payload, offset) {
                    Ok(value) => grid.set(r, c, value),
                    Err(err) => match self.policy {
                        MalformedPolicy::Pad => {
                            log::debug!("{err}, padding pixel ({r}, {c})");
                            malformed += 1;
                        }
                        MalformedPolicy::Abort => return Err(err),
                    },
                }
            }
        }

        if malformed > 0 {
            log::warn!("Packet {} had {malformed} malformed pixel(s)", payload.index);
        }

        Ok(Raster { grid, malformed })
    }
}
