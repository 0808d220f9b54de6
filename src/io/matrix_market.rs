//! Coordinate-format Matrix Market reader.
//!
//! Lines starting with `%` (the `%%MatrixMarket` banner included) and blank
//! lines are skipped. The first remaining line is `M N L`, followed by `L`
//! lines of `row col value` with 1-based indices. Entries are staged on the
//! target and committed once at the end, so a sparse target is finalized a
//! single time.

use crate::core::traits::{MatrixSet, Scalar};
use crate::error::KError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Open `path` and read it with [`read_matrix_market`].
pub fn read_matrix_market_file<T, M>(path: impl AsRef<Path>) -> Result<M, KError>
where
    T: Scalar,
    M: MatrixSet<T>,
{
    let path = path.as_ref();
    info!(path = %path.display(), "reading Matrix Market file");
    let file = File::open(path)?;
    read_matrix_market(BufReader::new(file))
}

/// Parse a coordinate Matrix Market stream into any [`MatrixSet`] target.
///
/// # Errors
///
/// [`KError::Parse`] carries the 1-based line number of a malformed
/// header or entry, an index outside the declared shape, or a missing or
/// surplus entry. Read failures surface as [`KError::Io`].
pub fn read_matrix_market<T, M, R>(reader: R) -> Result<M, KError>
where
    T: Scalar,
    M: MatrixSet<T>,
    R: BufRead,
{
    let mut target: Option<(M, usize)> = None;
    let mut read = 0;
    let mut last_line = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        let Some((matrix, expected)) = target.as_mut() else {
            let &[m, n, l] = fields.as_slice() else {
                return Err(parse_error(line_no, format!("expected header `M N L`, found {trimmed:?}")));
            };
            let (m, n, l) = (field::<usize>(m, line_no)?, field::<usize>(n, line_no)?, field::<usize>(l, line_no)?);
            info!(nrows = m, ncols = n, entries = l, "Matrix Market header");
            target = Some((M::with_shape(m, n), l));
            continue;
        };

        if read == *expected {
            return Err(parse_error(line_no, format!("more entries than the {expected} declared")));
        }
        let &[row, col, value] = fields.as_slice() else {
            return Err(parse_error(line_no, format!("expected `row col value`, found {trimmed:?}")));
        };
        let row = field::<usize>(row, line_no)?;
        let col = field::<usize>(col, line_no)?;
        let value = T::lit(field::<f64>(value, line_no)?);
        if row == 0 || col == 0 || row > matrix.nrows() || col > matrix.ncols() {
            return Err(parse_error(
                line_no,
                format!("entry ({row}, {col}) outside a {}x{} matrix", matrix.nrows(), matrix.ncols()),
            ));
        }
        matrix.stage_value(row - 1, col - 1, value)?;
        read += 1;
    }

    let Some((mut matrix, expected)) = target else {
        return Err(parse_error(last_line.max(1), "missing `M N L` header".into()));
    };
    if read != expected {
        return Err(parse_error(
            last_line,
            format!("expected {expected} entries, found {read}"),
        ));
    }
    matrix.commit();
    debug!(entries = read, "Matrix Market read complete");
    Ok(matrix)
}

fn field<F: FromStr>(token: &str, line: usize) -> Result<F, KError> {
    token
        .parse()
        .map_err(|_| parse_error(line, format!("cannot parse {token:?}")))
}

fn parse_error(line: usize, message: String) -> KError {
    KError::Parse { line, message }
}
