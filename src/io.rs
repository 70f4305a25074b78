use std::io;
use std::path::Path;

use crate::error::{CfError, Result};
use crate::itemknn::prediction::{PredictedMatrix, Prediction};
use crate::itemknn::similarity::SimilarityMatrix;
use crate::ratings::{Rating, RatingBounds, RatingMatrix};

/// Cell value that marks a missing rating in exchanged files, next to blank cells.
pub const MISSING_SENTINEL: Rating = -1.0;

const NOT_RATED: &str = "Not rated";

pub fn read_ratings<P: AsRef<Path>>(path: P, bounds: RatingBounds) -> Result<RatingMatrix> {
    tracing::debug!(path = %path.as_ref().display(), "reading ratings");
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    ratings_from_csv(reader, bounds)
}

/// Parses the tabular exchange format: a header row of item ids (the first
/// cell is ignored), then one row per user with one cell per item.
pub fn ratings_from_reader<R: io::Read>(reader: R, bounds: RatingBounds) -> Result<RatingMatrix> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    ratings_from_csv(reader, bounds)
}

fn ratings_from_csv<R: io::Read>(
    mut reader: csv::Reader<R>,
    bounds: RatingBounds,
) -> Result<RatingMatrix> {
    let mut records = reader.records();

    let header = match records.next() {
        Some(header) => header?,
        None => return Err(CfError::InvalidMatrix("empty ratings file".to_string())),
    };
    let items: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

    let mut users = Vec::new();
    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        if record.iter().all(str::is_empty) {
            tracing::warn!(line, "skipping empty ratings row");
            continue;
        }
        if record.len() != items.len() + 1 {
            return Err(CfError::InvalidMatrix(format!(
                "line {} has {} rating cells, expected {}",
                line,
                record.len().saturating_sub(1),
                items.len()
            )));
        }

        let mut row = Vec::with_capacity(items.len());
        for (column, cell) in record.iter().enumerate().skip(1) {
            row.push(parse_cell(cell, line, column)?);
        }
        users.push(record[0].to_string());
        rows.push(row);
    }

    RatingMatrix::new(users, items, rows, bounds)
}

fn parse_cell(cell: &str, line: u64, column: usize) -> Result<Option<Rating>> {
    if cell.is_empty() {
        return Ok(None);
    }
    let rating: Rating = cell.parse().map_err(|_| CfError::Parse {
        line,
        column,
        value: cell.to_string(),
    })?;
    if rating == MISSING_SENTINEL {
        Ok(None)
    } else {
        Ok(Some(rating))
    }
}

/// Writes `matrix` in the exchange format, leaving missing ratings blank.
pub fn write_ratings<W: io::Write>(writer: W, matrix: &RatingMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(std::iter::once("user").chain(matrix.items().iter().map(String::as_str)))?;
    for (user_idx, user) in matrix.users().iter().enumerate() {
        let cells = matrix.user_row(user_idx).iter().map(|rating| match rating {
            Some(rating) => rating.to_string(),
            None => String::new(),
        });
        writer.write_record(std::iter::once(user.clone()).chain(cells))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_similarities<W: io::Write>(writer: W, similarities: &SimilarityMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let items = similarities.items();
    writer.write_record(
        std::iter::once(similarities.metric().name()).chain(items.iter().map(String::as_str)),
    )?;
    for (item_idx, item) in items.iter().enumerate() {
        let cells = similarities.row(item_idx).iter().map(|value| format!("{:.2}", value));
        writer.write_record(std::iter::once(item.clone()).chain(cells))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_predictions<W: io::Write>(writer: W, predictions: &PredictedMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(
        std::iter::once("user").chain(predictions.items().iter().map(String::as_str)),
    )?;
    for (user_idx, user) in predictions.users().iter().enumerate() {
        let cells = predictions.user_row(user_idx).iter().map(|cell| match cell {
            Prediction::Observed(rating) | Prediction::Estimated(rating) => rating.to_string(),
            Prediction::Unpredictable => NOT_RATED.to_string(),
        });
        writer.write_record(std::iter::once(user.clone()).chain(cells))?;
    }
    writer.flush()?;
    Ok(())
}
