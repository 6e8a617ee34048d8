//! Delimited text I/O for [`Frame`].
//!
//! Column kinds are inferred on read: a column whose every non-empty cell
//! parses as `f64` is numeric (empty cells become `NaN`), anything else is
//! categorical. Numeric cells are written with Rust's shortest round-trip
//! formatting, so a write followed by a read reproduces the same values.

use super::{Column, Frame};
use crate::error::WrangleError;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Read a delimited file with a header row.
///
/// # Example
///
/// ```no_run
/// use wine_wrangle::frame::read_csv;
///
/// let red = read_csv("winequality-red.csv", b';').unwrap();
/// println!("{} rows", red.n_rows());
/// ```
pub fn read_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Frame, WrangleError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        WrangleError::IoError(format!("cannot open {}: {}", path.display(), e))
    })?;
    let frame = read_csv_from_reader(BufReader::new(file), delimiter)?;
    tracing::debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "read csv"
    );
    Ok(frame)
}

/// Read delimited text with a header row from any reader.
pub fn read_csv_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Frame, WrangleError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for result in rdr.records() {
        let record = result?;
        if record.len() != headers.len() {
            return Err(WrangleError::CsvError(format!(
                "record has {} fields, header has {}",
                record.len(),
                headers.len()
            )));
        }
        for (col, field) in record.iter().enumerate() {
            cells[col].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| (name, infer_column(values)))
        .collect();
    Frame::new(columns)
}

fn infer_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values
        .iter()
        .map(|v| {
            if v.is_empty() {
                Some(f64::NAN)
            } else {
                v.parse::<f64>().ok()
            }
        })
        .collect();
    match parsed {
        Some(numbers) => Column::Numeric(numbers),
        None => Column::Categorical(values),
    }
}

/// Write a frame with a header row.
pub fn write_csv<P: AsRef<Path>>(
    frame: &Frame,
    path: P,
    delimiter: u8,
) -> Result<(), WrangleError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        WrangleError::IoError(format!("cannot create {}: {}", path.display(), e))
    })?;
    write_csv_to_writer(frame, BufWriter::new(file), delimiter)?;
    tracing::debug!(path = %path.display(), rows = frame.n_rows(), "wrote csv");
    Ok(())
}

/// Write a frame with a header row to any writer.
pub fn write_csv_to_writer<W: Write>(
    frame: &Frame,
    writer: W,
    delimiter: u8,
) -> Result<(), WrangleError> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record(frame.names())?;

    let mut record: Vec<String> = Vec::with_capacity(frame.n_cols());
    for row in 0..frame.n_rows() {
        record.clear();
        for (_, column) in frame.iter() {
            record.push(match column {
                Column::Numeric(values) if values[row].is_nan() => String::new(),
                Column::Numeric(values) => values[row].to_string(),
                Column::Categorical(values) => values[row].clone(),
            });
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
