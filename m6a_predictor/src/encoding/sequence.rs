use polars::prelude::*;
use tracing::{debug, warn};

use crate::errors::{PredictError, PredictResult};
use crate::models::{CategoricalDomain, Nucleotide, NT_POS_PREFIX};

pub fn position_column_name(position: usize) -> String {
    format!("{}{}", NT_POS_PREFIX, position)
}

/// Split fixed-length DNA strings into one categorical column per position.
///
/// Columns are named `nt_pos1..nt_posN`, where N is the length of the first
/// non-null sequence. Characters outside {A,T,C,G}, whitespace included, are
/// left unmapped (null) and a null sequence is null at every position.
/// Sequences of any other length are rejected.
///
/// # Errors
///
/// * `PredictError::SequenceLengthMismatch` naming the first offending row
pub fn encode_dna_positions<'a, I>(sequences: I) -> PredictResult<DataFrame>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let rows: Vec<Option<Vec<char>>> = sequences
        .into_iter()
        .map(|opt| opt.map(|seq| seq.chars().collect()))
        .collect();

    let width = match rows.iter().flatten().next() {
        Some(first) => first.len(),
        None => {
            debug!("No sequences to encode across {} rows", rows.len());
            return Ok(DataFrame::empty());
        }
    };

    for (row, seq) in rows.iter().enumerate() {
        if let Some(seq) = seq {
            if seq.len() != width {
                return Err(PredictError::SequenceLengthMismatch {
                    row,
                    expected: width,
                    found: seq.len(),
                });
            }
        }
    }

    let mut unmapped = 0usize;
    let mut columns: Vec<Column> = Vec::with_capacity(width);
    for pos in 0..width {
        let values: Vec<Option<&'static str>> = rows
            .iter()
            .map(|seq| {
                seq.as_ref().and_then(|chars| {
                    let nt = Nucleotide::from_char(chars[pos]).map(|nt| nt.as_str());
                    if nt.is_none() {
                        unmapped += 1;
                    }
                    nt
                })
            })
            .collect();
        columns.push(Series::new(position_column_name(pos + 1).into(), values).into());
    }

    if unmapped > 0 {
        warn!(
            "{} nucleotide(s) outside {{A,T,C,G}} left unmapped across {} sequences",
            unmapped,
            rows.len()
        );
    }

    Ok(DataFrame::new(columns)?)
}

/// Encode the string column `column` of `df`.
pub fn encode_dna_column(df: &DataFrame, column: &str) -> PredictResult<DataFrame> {
    let seqs = df.column(column)?.cast(&DataType::String)?;
    encode_dna_positions(seqs.str()?.into_iter())
}
