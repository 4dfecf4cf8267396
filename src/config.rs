//! Image shape and parsing options shared by every stage of the pipeline.
//!
//! An [ImageConfig] is built once (usually from the command line) and handed to the
//! tokenizer, rasterizer and assembler. It never changes after [ImageConfigBuilder::build].
use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Error, Result};

/// Largest Ethernet frame, used only to size the pixel grid.
pub const DEFAULT_MTU: usize = 1514;
pub const DEFAULT_COLS: usize = 32;
pub const DEFAULT_PACKET_COUNT: usize = 100;
pub const DEFAULT_PADDING: u8 = 255;

/// Decides which dump lines open a new packet record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarkerRule {
    /// Any line containing "IP" anywhere. Matches what the tool always did,
    /// including false boundaries when "IP" shows up in the ASCII column.
    #[default]
    Substring,
    /// Header lines only: not an offset line, and carrying a standalone `IP`/`IP6` token.
    Header,
}

/// What to do with a pixel whose hex pair does not decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Write the padding value, count it and keep going.
    #[default]
    Pad,
    /// Fail the whole build.
    Abort,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageConfig {
    cols: usize,
    mtu: usize,
    packet_count: usize,
    padding_value: u8,
    marker: MarkerRule,
    on_malformed: MalformedPolicy,
    separator: Option<String>,
}

impl ImageConfig {
    pub fn builder() -> ImageConfigBuilder {
        ImageConfigBuilder::default()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// `ceil(mtu / cols)`, computed in integer space.
    pub fn rows(&self) -> usize {
        self.mtu.div_ceil(self.cols)
    }

    pub fn packet_count(&self) -> usize {
        self.packet_count
    }

    pub fn padding_value(&self) -> u8 {
        self.padding_value
    }

    pub fn marker(&self) -> MarkerRule {
        self.marker
    }

    pub fn on_malformed(&self) -> MalformedPolicy {
        self.on_malformed
    }

    /// Custom line separator. `None` splits on `\n` and `\r\n` alike.
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    /// Number of hex digits a grid can ever read from a payload.
    pub fn hex_capacity(&self) -> usize {
        self.rows() * self.cols * 2
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            mtu: DEFAULT_MTU,
            packet_count: DEFAULT_PACKET_COUNT,
            padding_value: DEFAULT_PADDING,
            marker: MarkerRule::default(),
            on_malformed: MalformedPolicy::default(),
            separator: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ImageConfigBuilder {
    inner: ImageConfig,
}

impl ImageConfigBuilder {
    pub fn cols(mut self, cols: usize) -> Self {
        self.inner.cols = cols;
        self
    }

    pub fn mtu(mut self, mtu: usize) -> Self {
        self.inner.mtu = mtu;
        self
    }

    pub fn packet_count(mut self, packet_count: usize) -> Self {
        self.inner.packet_count = packet_count;
        self
    }

    pub fn padding_value(mut self, padding_value: u8) -> Self {
        self.inner.padding_value = padding_value;
        self
    }

    pub fn marker(mut self, marker: MarkerRule) -> Self {
        self.inner.marker = marker;
        self
    }

    pub fn on_malformed(mut self, policy: MalformedPolicy) -> Self {
        self.inner.on_malformed = policy;
        self
    }

    pub fn separator(mut self, separator: Option<String>) -> Self {
        self.inner.separator = separator;
        self
    }

    /// Validates and freezes the configuration.
    pub fn build(self) -> Result<ImageConfig> {
        let config = self.inner;

        if config.cols == 0 {
            return Err(Error::Config("cols must be greater than zero".into()));
        }
        if config.mtu == 0 {
            return Err(Error::Config("mtu must be greater than zero".into()));
        }
        if config.packet_count == 0 {
            return Err(Error::Config("packet count must be greater than zero".into()));
        }
        if matches!(config.separator.as_deref(), Some("")) {
            return Err(Error::Config("line separator cannot be empty".into()));
        }

        // The dataset is one allocation of rows * cols * packet_count bytes, and the
        // tokenizer sizes payloads by hex_capacity.
        let cells = config
            .rows()
            .checked_mul(config.cols)
            .and_then(|grid| grid.checked_mul(config.packet_count))
            .filter(|&cells| cells <= isize::MAX as usize);
        let hex_capacity = config
            .rows()
            .checked_mul(config.cols)
            .and_then(|grid| grid.checked_mul(2));
        if cells.is_none() || hex_capacity.is_none() {
            return Err(Error::Config(format!(
                "a {} x {} image over {} packets is too large",
                config.rows(),
                config.cols,
                config.packet_count
            )));
        }

        Ok(config)
    }
}
