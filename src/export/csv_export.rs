use std::fs::File;
use std::io::BufWriter;

use csv::{Writer, WriterBuilder};

use crate::error::ExportError;
use crate::models::MatchSuggestion;

pub const REPORT_HEADERS: [&str; 4] = ["rk_name", "possible_match", "company_id", "similarity"];

/// Write the unmatched recordkeeper report. Names without a suggestion get
/// empty match cells.
pub fn write_unmatched_report(
    path: &str,
    suggestions: &[MatchSuggestion],
) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    let buf_writer = BufWriter::with_capacity(64 * 1024, file);
    let mut w = WriterBuilder::new().from_writer(buf_writer);
    write_report(&mut w, suggestions)?;
    w.flush()?;
    Ok(suggestions.len())
}

fn write_report<W: std::io::Write>(
    w: &mut Writer<W>,
    suggestions: &[MatchSuggestion],
) -> Result<(), ExportError> {
    w.write_record(REPORT_HEADERS)?;
    for s in suggestions {
        let company_id = s.company_id.map(|v| v.to_string()).unwrap_or_default();
        let distance = s.distance.map(|v| v.to_string()).unwrap_or_default();
        w.write_record([
            s.rk_name.as_str(),
            s.possible_match.as_deref().unwrap_or(""),
            company_id.as_str(),
            distance.as_str(),
        ])?;
    }
    Ok(())
}
