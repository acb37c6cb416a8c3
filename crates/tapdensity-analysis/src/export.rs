//! CSV export of analysis results.
//!
//! Plain comma-separated text with a header line, readable by spreadsheets and
//! plotting tools. Each table has a `write_*` function for any
//! [`Write`] sink and an `export_*` wrapper that writes a file.

use std::io::Write;
use std::path::Path;

use crate::{CorrelationMatrix, SweepRow, TapRecommendation};

/// Header of the sweep table.
pub const SWEEP_CSV_HEADER: &str = "comb_size_ms,taps,pattern,span_samples,unique_positions,\
largest_group,adjacent_correlation,gain_multiplication,coherent_gain_multiplication,\
adaptive_factor,gain,attenuation_db,path";

/// Write sweep rows as CSV.
pub fn write_sweep_csv<W: Write>(rows: &[SweepRow], mut out: W) -> std::io::Result<()> {
    writeln!(out, "{SWEEP_CSV_HEADER}")?;
    for row in rows {
        writeln!(
            out,
            "{:.6},{},{},{:.6},{},{},{:.6},{:.6},{:.6},{:.6},{:.8},{:.3},{}",
            row.comb_size_ms,
            row.taps,
            row.pattern,
            row.span_samples,
            row.unique_positions,
            row.largest_group,
            row.adjacent_correlation,
            row.gain_multiplication,
            row.coherent_gain_multiplication,
            row.adaptive_factor,
            row.gain,
            row.attenuation_db,
            if row.spread { "spread" } else { "clustered" },
        )?;
    }
    Ok(())
}

/// Export sweep rows to a CSV file.
///
/// # Example
///
/// ```rust,ignore
/// use tapdensity_analysis::{export::export_sweep_csv, log_spaced, sweep_comb_sizes};
///
/// let rows = sweep_comb_sizes(&engine, 64, TapPattern::Linear, log_spaced(0.05, 20.0, 40));
/// export_sweep_csv(&rows, "sweep.csv")?;
/// ```
pub fn export_sweep_csv(rows: &[SweepRow], path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_sweep_csv(rows, &mut out)?;
    out.flush()
}

/// Write tap recommendations as CSV.
pub fn write_recommendations_csv<W: Write>(
    recommendations: &[TapRecommendation],
    mut out: W,
) -> std::io::Result<()> {
    writeln!(
        out,
        "comb_size_ms,span_samples,spacing_limit,clustering_limit,recommended"
    )?;
    for r in recommendations {
        writeln!(
            out,
            "{:.6},{:.6},{},{},{}",
            r.comb_size_ms,
            r.span_samples,
            r.spacing_limit,
            r.clustering_limit,
            r.recommended()
        )?;
    }
    Ok(())
}

/// Write a correlation matrix as CSV, one row per tap, with a `tap` column.
pub fn write_matrix_csv<W: Write>(matrix: &CorrelationMatrix, mut out: W) -> std::io::Result<()> {
    write!(out, "tap")?;
    for j in 0..matrix.size() {
        write!(out, ",{j}")?;
    }
    writeln!(out)?;

    for (i, row) in matrix.rows().enumerate() {
        write!(out, "{i}")?;
        for value in row {
            write!(out, ",{value:.6}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Export a correlation matrix to a CSV file.
pub fn export_matrix_csv(matrix: &CorrelationMatrix, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_matrix_csv(matrix, &mut out)?;
    out.flush()
}
