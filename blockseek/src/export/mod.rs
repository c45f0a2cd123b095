//! Delimited-text export of search results.
//!
//! Files are written as:
//!
//! ```text
//! x,y,z,dimension
//! 1,2,3,overworld
//! -17,64,40,the_nether
//! ```
//!
//! Coordinates are decimal integers and dimensions are written verbatim. No
//! field needs quoting. Each export creates a new file named after the local
//! time, `blocks_<YYYYmmddHHMMSS>.csv`; an existing file is never replaced.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

use crate::scan::BlockMatch;

/// Header line of every export file.
pub const CSV_HEADER: &str = "x,y,z,dimension";

/// How many `_<n>` suffixes are tried before giving up on a file name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Errors raised while writing or reading export files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No free file name for {stem} in {directory}")]
    NameExhausted { directory: PathBuf, stem: String },

    #[error("Line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Writes match lists into a directory.
#[derive(Debug, Clone)]
pub struct ResultExporter {
    directory: PathBuf,
}

impl ResultExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `matches` to a new file stamped with the current local time.
    pub fn export(&self, matches: &[BlockMatch]) -> Result<PathBuf, ExportError> {
        self.export_at(matches, Local::now())
    }

    /// Write `matches` to a new file stamped with `timestamp`.
    ///
    /// The output directory is created when missing. A file that fails
    /// half-way is removed again.
    pub fn export_at(
        &self,
        matches: &[BlockMatch],
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.directory).map_err(|source| ExportError::CreateDir {
            path: self.directory.clone(),
            source,
        })?;

        let stem = format!("blocks_{}", timestamp.format("%Y%m%d%H%M%S"));
        let (path, file) = self.create_unique(&stem)?;

        let mut writer = BufWriter::new(file);
        let written = write_matches(&mut writer, matches).and_then(|()| writer.flush());
        drop(writer);
        if let Err(source) = written {
            let _ = fs::remove_file(&path);
            return Err(ExportError::Write { path, source });
        }

        info!(path = %path.display(), matches = matches.len(), "Exported matches");
        Ok(path)
    }

    fn create_unique(&self, stem: &str) -> Result<(PathBuf, File), ExportError> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = match attempt {
                0 => format!("{}.csv", stem),
                n => format!("{}_{}.csv", stem, n),
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ExportError::Write { path, source }),
            }
        }
        Err(ExportError::NameExhausted {
            directory: self.directory.clone(),
            stem: stem.to_string(),
        })
    }
}

/// Write the header and one line per match, in order.
pub fn write_matches<W: Write>(writer: &mut W, matches: &[BlockMatch]) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for m in matches {
        writeln!(writer, "{},{},{},{}", m.x, m.y, m.z, m.dimension)?;
    }
    Ok(())
}

/// Parse export text back into matches.
pub fn parse_matches(text: &str) -> Result<Vec<BlockMatch>, ExportError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, CSV_HEADER)) => {}
        _ => {
            return Err(ExportError::Parse {
                line: 1,
                reason: format!("expected header '{}'", CSV_HEADER),
            })
        }
    }

    lines
        .map(|(index, line)| {
            let parse_error = |reason: String| ExportError::Parse {
                line: index + 1,
                reason,
            };
            let fields: Vec<&str> = line.split(',').collect();
            let [x, y, z, dimension] = fields[..] else {
                return Err(parse_error(format!("expected 4 fields, got {}", fields.len())));
            };
            let coord = |field: &str| {
                field
                    .parse::<i32>()
                    .map_err(|e| parse_error(format!("bad coordinate '{}': {}", field, e)))
            };
            Ok(BlockMatch::new(coord(x)?, coord(y)?, coord(z)?, dimension))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample() -> Vec<BlockMatch> {
        vec![
            BlockMatch::new(1, 2, 3, "overworld"),
            BlockMatch::new(-17, 64, 40, "the_nether"),
        ]
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_write_matches_format() {
        let mut out = Vec::new();
        write_matches(&mut out, &sample()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "x,y,z,dimension\n1,2,3,overworld\n-17,64,40,the_nether\n"
        );
    }

    #[test]
    fn test_export_creates_directory_and_names_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("results");
        let exporter = ResultExporter::new(&dir);

        let path = exporter.export_at(&sample(), timestamp()).unwrap();
        assert_eq!(path, dir.join("blocks_20240309140507.csv"));

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert_eq!(parse_matches(&text).unwrap(), sample());
    }

    #[test]
    fn test_export_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let exporter = ResultExporter::new(temp.path());

        let first = exporter.export_at(&sample(), timestamp()).unwrap();
        let second = exporter.export_at(&[], timestamp()).unwrap();
        let third = exporter.export_at(&[], timestamp()).unwrap();

        assert_eq!(second, temp.path().join("blocks_20240309140507_1.csv"));
        assert_eq!(third, temp.path().join("blocks_20240309140507_2.csv"));
        assert_eq!(fs::read_to_string(first).unwrap().lines().count(), 3);
        assert_eq!(fs::read_to_string(second).unwrap(), "x,y,z,dimension\n");
    }

    #[test]
    fn test_export_into_file_path_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();

        let err = ResultExporter::new(&blocker).export(&sample()).unwrap_err();
        assert!(matches!(err, ExportError::CreateDir { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            parse_matches("a,b\n1,2,3,overworld"),
            Err(ExportError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_matches("x,y,z,dimension\n1,2,overworld"),
            Err(ExportError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_matches("x,y,z,dimension\n1,2,3,overworld\n1,up,3,overworld"),
            Err(ExportError::Parse { line: 3, .. })
        ));
    }
}
