//! Text matrix format
//!
//! A matrix is stored as exactly four comma-separated lines:
//!
//! ```text
//! rows,cols
//! values
//! column indices
//! row pointers
//! ```
//!
//! Fields contain no whitespace, no field may be empty and lines carry no
//! trailing comma. The values and column-index lines are empty when the matrix
//! stores no entries. Readers accept at most one newline after the last line;
//! writers emit none.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::MatrixFileError;
use crate::kernels::Scalar;
use crate::matrix::{validate, SparseMatrixCSR};

const LINE_COUNT: usize = 4;

type FileResult<T> = std::result::Result<T, MatrixFileError>;

fn format_error(line: usize, reason: impl Into<String>) -> MatrixFileError {
    MatrixFileError::Format {
        line,
        reason: reason.into(),
    }
}

/// Splits one line into fields and parses each of them
///
/// `allowed` restricts the characters a field may contain before it is handed
/// to `FromStr`.
fn parse_fields<F, P>(line: &str, line_no: usize, allow_empty: bool, allowed: P) -> FileResult<Vec<F>>
where
    F: FromStr,
    P: Fn(u8) -> bool,
{
    if line.is_empty() {
        return if allow_empty {
            Ok(Vec::new())
        } else {
            Err(format_error(line_no, "line is empty"))
        };
    }

    line.split(',')
        .enumerate()
        .map(|(position, field)| {
            if field.is_empty() {
                return Err(format_error(line_no, format!("field {} is empty", position)));
            }
            if !field.bytes().all(&allowed) {
                return Err(format_error(
                    line_no,
                    format!("field {} contains an unexpected character: {:?}", position, field),
                ));
            }
            field
                .parse()
                .map_err(|_| format_error(line_no, format!("cannot parse field {}: {:?}", position, field)))
        })
        .collect()
}

fn is_index_char(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_value_char(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'-'
}

/// Parses a matrix from its text form and validates it
///
/// # Errors
///
/// [`MatrixFileError::Read`] if the reader fails, [`MatrixFileError::Format`]
/// if the text is not UTF-8, does not follow the layout or holds a value
/// outside the element type's finite range, and [`MatrixFileError::Invalid`] if
/// the parsed arrays break a CSR invariant.
pub fn read_matrix<T, R>(mut reader: R) -> FileResult<SparseMatrixCSR<T>>
where
    T: Scalar + FromStr,
    R: Read,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(MatrixFileError::Read)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        format_error(line, "not valid UTF-8")
    })?;

    let body = text.strip_suffix('\n').unwrap_or(&text);
    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() != LINE_COUNT {
        return Err(format_error(
            lines.len().min(LINE_COUNT),
            format!("expected {} lines, found {}", LINE_COUNT, lines.len()),
        ));
    }

    let shape: Vec<usize> = parse_fields(lines[0], 1, false, is_index_char)?;
    let (n_rows, n_cols) = match shape[..] {
        [n_rows, n_cols] => (n_rows, n_cols),
        _ => return Err(format_error(1, format!("expected 2 dimensions, found {}", shape.len()))),
    };

    let values: Vec<T> = parse_fields(lines[1], 2, true, is_value_char)?;
    if let Some(position) = values.iter().position(|&v| !v.is_finite()) {
        return Err(format_error(2, format!("value {} is out of range", position)));
    }
    let col_idx: Vec<usize> = parse_fields(lines[2], 3, true, is_index_char)?;
    let row_ptr: Vec<usize> = parse_fields(lines[3], 4, false, is_index_char)?;

    let matrix = SparseMatrixCSR {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    };
    validate(&matrix)?;

    debug!(n_rows, n_cols, nnz = matrix.nnz(), "matrix parsed");
    Ok(matrix)
}

/// Opens `path` and parses the matrix it contains
pub fn read_matrix_file<T, P>(path: P) -> FileResult<SparseMatrixCSR<T>>
where
    T: Scalar + FromStr,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MatrixFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_matrix(file)
}

fn write_fields<W, F>(writer: &mut W, fields: &[F]) -> std::io::Result<()>
where
    W: Write,
    F: Display,
{
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write!(writer, "{}", field)?;
    }
    Ok(())
}

/// Writes `matrix` in the text format, without a trailing newline
pub fn write_matrix<T, W>(mut writer: W, matrix: &SparseMatrixCSR<T>) -> FileResult<()>
where
    T: Display,
    W: Write,
{
    let write_all = |writer: &mut W| -> std::io::Result<()> {
        writeln!(writer, "{},{}", matrix.n_rows, matrix.n_cols)?;
        write_fields(writer, &matrix.values)?;
        writer.write_all(b"\n")?;
        write_fields(writer, &matrix.col_idx)?;
        writer.write_all(b"\n")?;
        write_fields(writer, &matrix.row_ptr)?;
        writer.flush()
    };

    write_all(&mut writer).map_err(MatrixFileError::Write)
}

/// Creates (or truncates) `path` and writes `matrix` into it
pub fn write_matrix_file<T, P>(path: P, matrix: &SparseMatrixCSR<T>) -> FileResult<()>
where
    T: Display,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| MatrixFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write_matrix(BufWriter::new(file), matrix)?;

    debug!(path = %path.display(), nnz = matrix.values.len(), "matrix written");
    Ok(())
}
