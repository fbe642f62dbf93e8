//! Newline-delimited JSON telemetry files

use crate::error::IngestError;
use crate::models::{RawSensorReading, SensorReading};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Streams readings from NDJSON, one `Result` per non-blank line. Line
/// numbers in errors are 1-based.
pub struct ReadingReader<R> {
    lines: std::io::Lines<BufReader<R>>,
    line_no: usize,
}

impl<R: Read> ReadingReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_no: 0,
        }
    }
}

impl ReadingReader<File> {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> Iterator for ReadingReader<R> {
    type Item = Result<SensorReading, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(IngestError::Io(e))),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = self.line_no;
            return Some(
                SensorReading::from_json(&line).map_err(|source| IngestError::Record { line: line_no, source }),
            );
        }
    }
}

/// Raw wire records, unvalidated, with their line numbers. Used where the
/// caller wants its own error mapping (training reports missing columns).
pub fn read_raw(path: &Path) -> Result<Vec<(usize, Result<RawSensorReading, serde_json::Error>)>, IngestError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push((idx + 1, serde_json::from_str(&line)));
    }
    Ok(records)
}

/// Read a whole file, failing on the first invalid record
pub fn read_readings(path: &Path) -> Result<Vec<SensorReading>, IngestError> {
    ReadingReader::open(path)?.collect()
}

/// Write records as NDJSON, one per line
pub fn write_ndjson<T: Serialize>(path: &Path, records: &[T]) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::models::fixtures::{reading, reading_json};
    use tempfile::TempDir;

    #[test]
    fn test_skips_blank_lines_and_numbers_from_one() {
        let body = format!(
            "{}\n\n   \n{}\n{{\"vehicle_id\": \"VH-1\"}}\n",
            reading_json("OK", "OK", "OK"),
            reading_json("WARN_TEMP", "OK", "OK"),
        );
        let results: Vec<_> = ReadingReader::new(body.as_bytes()).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap().has_fault_code());
        match &results[2] {
            Err(IngestError::Record { line, source }) => {
                assert_eq!(*line, 5);
                assert!(matches!(source, ValidationError::MissingField(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("telemetry.jsonl");
        let readings = vec![reading("OK", "OK", "OK"), reading("LOW_BATT", "OK", "BRAKE_WEAR")];
        write_ndjson(&path, &readings).unwrap();

        let back = read_readings(&path).unwrap();
        assert_eq!(back, readings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_readings(&dir.path().join("nope.jsonl")),
            Err(IngestError::Io(_))
        ));
    }

    #[test]
    fn test_read_raw_keeps_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.jsonl");
        std::fs::write(&path, format!("\n{}\nnot json\n", reading_json("OK", "OK", "OK"))).unwrap();

        let raw = read_raw(&path).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].0, 2);
        assert!(raw[0].1.is_ok());
        assert_eq!(raw[1].0, 3);
        assert!(raw[1].1.is_err());
    }
}
