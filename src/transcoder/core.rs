//! Wires tokenizer, assembler and store into a full dump-to-dataset run.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::ImageConfig;
use crate::error::Result;
use super::assembler::DatasetAssembler;
use super::containers::DatasetArray;
use super::store::{self, ArtifactFormat, NpyDtype};
use super::tokenizer::DumpTokenizer;
use super::utils;

/// Result of transcoding dump text in memory.
#[derive(Clone, Debug)]
pub struct Transcoded {
    pub dataset: DatasetArray,
    /// Every record in the dump, including those past `packet_count`.
    pub packets_found: usize,
    pub malformed: usize,
}

/// What `--metaonly` reports: the records of a dump, without rasterizing them.
#[derive(Clone, Debug, Serialize)]
pub struct Survey {
    pub input: PathBuf,
    pub packets_found: usize,
    /// Hex digits per record, in dump order.
    pub payload_digits: Vec<usize>,
    /// Records whose digit count is odd, i.e. that end in half a byte.
    pub odd_payloads: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: ArtifactFormat,
    pub packets_found: usize,
    pub packets_rasterized: usize,
    pub malformed_pixels: usize,
    pub rows: usize,
    pub width: usize,
    pub fingerprint: String,
    pub config: ImageConfig,
    pub generated_at: DateTime<Utc>,
}

/// Tokenizes and rasterizes `text` into a dataset.
pub fn transcode(text: &str, config: &ImageConfig) -> Result<Transcoded> {
    let mut tokenizer = DumpTokenizer::new(text, config);
    let assembly = DatasetAssembler::new(config).assemble(tokenizer.by_ref())?;

    let packets_found = config.packet_count() + tokenizer.count();
    log::info!("Found {packets_found} packets, kept {}.", config.packet_count());

    Ok(Transcoded {
        dataset: assembly.dataset,
        packets_found,
        malformed: assembly.malformed,
    })
}

/// Reads `input`, builds the dataset and atomically writes it to `output`.
///
/// Nothing is written unless the whole dataset was built.
pub fn run(
    input: &Path,
    output: &Path,
    config: &ImageConfig,
    format: Option<ArtifactFormat>,
    dtype: NpyDtype,
) -> Result<BuildSummary> {
    log::info!("Starting transcoding.");

    let text = utils::load_dump(input)?;
    let transcoded = transcode(&text, config)?;

    let format = format.unwrap_or_else(|| ArtifactFormat::from_path(output));
    store::save(&transcoded.dataset, output, format, dtype)?;

    let (rows, width) = transcoded.dataset.shape();
    Ok(BuildSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        format,
        packets_found: transcoded.packets_found,
        packets_rasterized: config.packet_count(),
        malformed_pixels: transcoded.malformed,
        rows,
        width,
        fingerprint: utils::fingerprint(&transcoded.dataset),
        config: config.clone(),
        generated_at: Utc::now(),
    })
}

/// Tokenizes `input` and describes its records.
pub fn survey(input: &Path, config: &ImageConfig) -> Result<Survey> {
    let text = utils::load_dump(input)?;
    let payload_digits: Vec<usize> = DumpTokenizer::new(&text, config)
        .map(|payload| payload.len())
        .collect();
    let odd_payloads = payload_digits.iter().filter(|&&n| n % 2 == 1).count();

    Ok(Survey {
        input: input.to_path_buf(),
        packets_found: payload_digits.len(),
        payload_digits,
        odd_payloads,
    })
}
