use crate::config::ImageConfig;
use crate::error::{Error, Result};
use super::containers::{DatasetArray, HexPayload};
use super::rasterizer::Rasterizer;

/// The stacked dataset and how many pixels were padded over malformed hex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    pub dataset: DatasetArray,
    pub malformed: usize,
}

/// Rasterizes the first `packet_count` payloads and lays them out side by side.
pub struct DatasetAssembler {
    rows: usize,
    cols: usize,
    packet_count: usize,
    padding: u8,
    rasterizer: Rasterizer,
}

impl DatasetAssembler {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            rows: config.rows(),
            cols: config.cols(),
            packet_count: config.packet_count(),
            padding: config.padding_value(),
            rasterizer: Rasterizer::new(config),
        }
    }

    /// Consumes at most `packet_count` payloads from `payloads`; anything after that is
    /// left in the iterator untouched.
    ///
    /// Packet `p` lands in columns `[p*cols, (p+1)*cols)`. Running out of payloads before
    /// the dataset is full is [Error::InsufficientPackets].
    pub fn assemble<I>(&self, payloads: I) -> Result<Assembly>
    where
        I: IntoIterator<Item = HexPayload>,
    {
        log::info!("Rasterizing {} packets into {}x{} images.", self.packet_count, self.rows, self.cols);

        let mut dataset = DatasetArray::filled(self.rows, self.cols, self.packet_count, self.padding);
        let mut malformed = 0;
        let mut placed = 0;

        for payload in payloads.into_iter().take(self.packet_count) {
            let raster = self.rasterizer.rasterize(&payload)?;
            dataset.place(placed, &raster.grid);
            malformed += raster.malformed;
            placed += 1;
        }

        if placed < self.packet_count {
            return Err(Error::InsufficientPackets {
                found: placed,
                expected: self.packet_count,
            });
        }

        Ok(Assembly { dataset, malformed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(digits: &[&str]) -> Vec<HexPayload> {
        digits
            .iter()
            .enumerate()
            .map(|(i, d)| HexPayload::new(i, d))
            .collect()
    }

    #[test]
    fn test_shape_matches_packet_count() {
        let config = ImageConfig::builder().packet_count(3).build().unwrap();
        let assembly = DatasetAssembler::new(&config)
            .assemble(payloads(&["", "00", "ff"]))
            .unwrap();

        assert_eq!(assembly.dataset.shape(), (48, 96));
        assert_eq!(assembly.dataset.data.len(), 48 * 96);
        assert_eq!(assembly.dataset.get(0, 32), 0);
        assert_eq!(assembly.dataset.get(0, 33), 255);
    }

    #[test]
    fn test_stops_at_packet_count() {
        let config = ImageConfig::builder().packet_count(1).build().unwrap();
        let mut source = payloads(&["01", "02", "03"]).into_iter();

        let assembly = DatasetAssembler::new(&config).assemble(source.by_ref()).unwrap();

        assert_eq!(assembly.dataset.get(0, 0), 1);
        assert_eq!(source.count(), 2);
    }

    #[test]
    fn test_insufficient_packets() {
        let config = ImageConfig::builder().packet_count(2).build().unwrap();
        let err = DatasetAssembler::new(&config)
            .assemble(payloads(&["01"]))
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientPackets { found: 1, expected: 2 }));
    }

    #[test]
    fn test_malformed_pixels_are_summed() {
        let config = ImageConfig::builder().packet_count(2).build().unwrap();
        let assembly = DatasetAssembler::new(&config)
            .assemble(payloads(&["4g", "zz0"]))
            .unwrap();

        assert_eq!(assembly.malformed, 3);
    }
}
