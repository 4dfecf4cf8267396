//! Saving and reloading [DatasetArray]s.
//!
//! Two formats are supported: NumPy `.npy` (C order, via `npyz`) so the images load
//! straight into the training side with `np.load`, and a JSON document for tooling that
//! would rather not parse binary. `load` tells them apart by the npy magic prefix.
//! Writes go to a temporary file next to the destination and are renamed into place,
//! so a failed save never leaves a truncated artifact behind.
use clap::ValueEnum;
use npyz::{DType, NpyWriter, Order, TypeStr, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use super::containers::DatasetArray;

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Npy,
    Json,
}

impl ArtifactFormat {
    /// `.json` files are JSON, anything else is `.npy`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Npy,
        }
    }

    /// `.npy` files announce themselves with a magic prefix; everything else is read as JSON.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(NPY_MAGIC) {
            ArtifactFormat::Npy
        } else {
            ArtifactFormat::Json
        }
    }
}

/// Element type written to `.npy` files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NpyDtype {
    /// `|u1`, one byte per pixel.
    #[default]
    U8,
    /// `<i8`, what `np.full(..., 255)` produces on most platforms.
    I64,
}

impl NpyDtype {
    fn descr(self) -> &'static str {
        match self {
            NpyDtype::U8 => "|u1",
            NpyDtype::I64 => "<i8",
        }
    }

    fn to_dtype(self) -> io::Result<DType> {
        let type_str: TypeStr = self
            .descr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e}")))?;
        Ok(DType::Plain(type_str))
    }

    fn from_descr(descr: &str) -> Option<Self> {
        match descr {
            "|u1" | "<u1" | "u1" => Some(NpyDtype::U8),
            "<i8" => Some(NpyDtype::I64),
            _ => None,
        }
    }
}

/// Atomically writes `dataset` to `path`.
pub fn save(dataset: &DatasetArray, path: &Path, format: ArtifactFormat, dtype: NpyDtype) -> Result<()> {
    log::info!("Saving {}x{} dataset to {}", dataset.rows, dataset.width(), path.display());

    publish(path, |writer| match format {
        ArtifactFormat::Npy => write_npy(writer, dataset, dtype),
        ArtifactFormat::Json => serde_json::to_writer(writer, dataset).map_err(io::Error::from),
    })
}

fn publish<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let persist_failure = |source: io::Error| Error::PersistFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_failure)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer).map_err(persist_failure)?;
        writer.flush().map_err(persist_failure)?;
    }
    tmp.as_file().sync_all().map_err(persist_failure)?;
    tmp.persist(path).map_err(|e| persist_failure(e.error))?;

    Ok(())
}

fn write_npy(writer: &mut dyn Write, dataset: &DatasetArray, dtype: NpyDtype) -> io::Result<()> {
    let shape = [dataset.rows as u64, dataset.width() as u64];

    match dtype {
        NpyDtype::U8 => {
            let mut npy: NpyWriter<u8, _> = npyz::WriteOptions::new()
                .dtype(dtype.to_dtype()?)
                .shape(&shape)
                .writer(writer)
                .begin_nd()?;
            npy.extend(dataset.data.iter().copied())?;
            npy.finish()
        }
        NpyDtype::I64 => {
            let mut npy: NpyWriter<i64, _> = npyz::WriteOptions::new()
                .dtype(dtype.to_dtype()?)
                .shape(&shape)
                .writer(writer)
                .begin_nd()?;
            npy.extend(dataset.data.iter().map(|&v| i64::from(v)))?;
            npy.finish()
        }
    }
}

/// Loads a dataset saved by [save], whatever its file extension. `cols` is the
/// per-packet image width, which the `.npy` shape alone cannot tell.
pub fn load(path: &Path, cols: usize) -> Result<DatasetArray> {
    let bytes = fs::read(path)?;

    let dataset = match ArtifactFormat::detect(&bytes) {
        ArtifactFormat::Json => {
            let dataset: DatasetArray = serde_json::from_slice(&bytes)
                .map_err(|e| Error::CorruptArtifact(e.to_string()))?;
            if dataset.cols != cols {
                return Err(Error::CorruptArtifact(format!(
                    "artifact has {} columns per packet, expected {cols}",
                    dataset.cols
                )));
            }
            dataset
        }
        ArtifactFormat::Npy => read_npy(&bytes, cols)?,
    };

    if !dataset.is_consistent() {
        return Err(Error::CorruptArtifact(format!(
            "{} cells do not fill {} rows of {} packets {} columns wide",
            dataset.data.len(),
            dataset.rows,
            dataset.packet_count,
            dataset.cols
        )));
    }

    Ok(dataset)
}

fn corrupt(reason: &str) -> Error {
    Error::CorruptArtifact(reason.to_string())
}

fn read_npy(bytes: &[u8], cols: usize) -> Result<DatasetArray> {
    if cols == 0 {
        return Err(corrupt("cols must be greater than zero"));
    }

    let npy = npyz::NpyFile::new(bytes).map_err(|e| Error::CorruptArtifact(e.to_string()))?;

    if matches!(npy.order(), Order::Fortran) {
        return Err(corrupt("fortran-ordered arrays are not supported"));
    }

    let (rows, width) = match npy.shape() {
        [rows, width] => (
            usize::try_from(*rows).map_err(|_| corrupt("npy row count does not fit in memory"))?,
            usize::try_from(*width).map_err(|_| corrupt("npy width does not fit in memory"))?,
        ),
        _ => return Err(corrupt("npy shape is not two-dimensional")),
    };
    if width % cols != 0 {
        return Err(Error::CorruptArtifact(format!(
            "width {width} is not a multiple of {cols} columns"
        )));
    }
    if rows.checked_mul(width).is_none() {
        return Err(corrupt("npy shape overflows"));
    }

    let descr = match npy.dtype() {
        DType::Plain(type_str) => type_str.to_string(),
        other => return Err(Error::CorruptArtifact(format!("unsupported dtype {other:?}"))),
    };
    let unreadable = |e: io::Error| Error::CorruptArtifact(e.to_string());

    let data = match NpyDtype::from_descr(&descr) {
        Some(NpyDtype::U8) => npy.into_vec::<u8>().map_err(unreadable)?,
        Some(NpyDtype::I64) => npy
            .into_vec::<i64>()
            .map_err(unreadable)?
            .into_iter()
            .map(|v| u8::try_from(v).map_err(|_| corrupt("pixel value outside 0..=255")))
            .collect::<Result<Vec<u8>>>()?,
        None => return Err(Error::CorruptArtifact(format!("unsupported dtype {descr}"))),
    };

    Ok(DatasetArray {
        rows,
        cols,
        packet_count: width / cols,
        data,
    })
}
