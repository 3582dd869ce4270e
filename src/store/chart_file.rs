// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::debug;

use crate::model::SseqChart;
use crate::protocol::{decode_chart_json, ChartMessage, DecodeError, DecoderRegistry};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus rename, no fsync.
    #[default]
    BestEffort,

    /// Also syncs the file and, on unix, its directory.
    Durable,
}

/// A chart document on disk.
#[derive(Debug, Clone)]
pub struct ChartFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl ChartFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<SseqChart, StoreError> {
        self.load_with(DecoderRegistry::shared())
    }

    pub fn load_with(&self, registry: &DecoderRegistry) -> Result<SseqChart, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let chart = decode_chart_json(registry, value).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source: Box::new(source),
        })?;
        debug!(
            path = %self.path.display(),
            classes = chart.num_classes(),
            edges = chart.num_edges(),
            "loaded chart"
        );
        Ok(chart)
    }

    pub fn save(&self, chart: &SseqChart) -> Result<(), StoreError> {
        let mut contents = serde_json::to_vec_pretty(chart).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        contents.push(b'\n');
        write_atomic(&self.path, &contents, self.durability)?;
        debug!(path = %self.path.display(), "saved chart");
        Ok(())
    }
}

/// Reads a JSON-lines message stream. Blank lines are skipped.
pub fn read_messages(path: &Path) -> Result<Vec<ChartMessage>, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| StoreError::MessageLine {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::Io {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, reason.to_owned()),
    };
    let file_name = path.file_name().ok_or_else(|| invalid("path has no file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".sseq-chart.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    write_tmp(&tmp_path, file, contents, durability)?;

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

/// Fills the temp file. On failure the temp file is closed and removed.
fn write_tmp<W: Write + SyncAll>(
    tmp_path: &Path,
    mut file: W,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    let mut written = file.write_all(contents);
    if written.is_ok() && durability == WriteDurability::Durable {
        written = file.sync_all();
    }
    drop(file);
    written.map_err(|source| {
        let _ = fs::remove_file(tmp_path);
        StoreError::Io {
            path: tmp_path.to_path_buf(),
            source,
        }
    })
}

trait SyncAll {
    fn sync_all(&mut self) -> io::Result<()>;
}

impl SyncAll for fs::File {
    fn sync_all(&mut self) -> io::Result<()> {
        fs::File::sync_all(self)
    }
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Decode {
        path: PathBuf,
        source: Box<DecodeError>,
    },
    MessageLine {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "json error at {}: {source}", path.display())
            }
            Self::Decode { path, source } => {
                write!(f, "cannot decode chart {}: {source}", path.display())
            }
            Self::MessageLine { path, line, source } => {
                write!(f, "bad message at {}:{line}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } | Self::MessageLine { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source.as_ref()),
        }
    }
}
