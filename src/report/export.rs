use serde::Serialize;
use std::io::Write;

use crate::utils::error::AppResult;

/// Write rows as CSV with a header line
pub fn write_csv<R: Serialize, W: Write>(rows: &[R], out: W) -> AppResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write rows as a pretty-printed JSON array
pub fn write_json<R: Serialize, W: Write>(rows: &[R], mut out: W) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
