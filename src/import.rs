//! Reader for the recordkeeper-name to company-id mapping CSV.
//!
//! The file has two columns, `sched_c_provider_name,fbi_company_id`, with an
//! optional header line.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;

use csv::ReaderBuilder;
use log::warn;

use crate::error::ImportError;
use crate::models::RkMapping;

#[derive(Debug, Clone, Default)]
pub struct RkImport {
    pub rows: Vec<RkMapping>,
    /// Reading stopped at a blank `,` line; later rows, if any, were not read.
    pub truncated: bool,
    pub skipped: usize,
}

fn open_reader(path: &str) -> Result<csv::Reader<BufReader<File>>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_string(),
        source,
    })?;
    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file)))
}

/// The file opens and its first record parses.
pub fn validate_csv_file(path: &str) -> Result<(), ImportError> {
    let mut rdr = open_reader(path)?;
    let mut record = csv::StringRecord::new();
    match rdr.read_record(&mut record) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ImportError::Read {
            path: path.to_string(),
            source: csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "file is empty",
            )),
        }),
        Err(source) => Err(ImportError::Read {
            path: path.to_string(),
            source,
        }),
    }
}

pub fn read_rk_mappings(path: &str) -> Result<RkImport, ImportError> {
    let mut rdr = open_reader(path)?;
    let mut out = RkImport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for result in rdr.records() {
        let record = result.map_err(|source| ImportError::Read {
            path: path.to_string(),
            source,
        })?;
        if record.len() != 2 {
            return Err(ImportError::UnexpectedLine {
                path: path.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                found: record.iter().map(str::to_string).collect(),
            });
        }
        let name = record[0].trim();
        let id = record[1].trim();
        if name.is_empty() && id.is_empty() {
            warn!(
                "Found a line with no data in {}, stopping reading now; repair the file if data was truncated",
                path
            );
            out.truncated = true;
            break;
        }
        // Non-numeric or zero ids are not valid company ids; this also drops the header.
        match id.parse::<i32>() {
            Ok(company_id) if company_id != 0 => {
                // The provider name is the mapping table's primary key; first row wins.
                if !seen.insert(name.to_string()) {
                    warn!(
                        "Duplicate rk mapping for {:?} in {} (company id {}); keeping the first",
                        name, path, company_id
                    );
                    out.skipped += 1;
                    continue;
                }
                out.rows.push(RkMapping {
                    provider_name: name.to_string(),
                    company_id,
                });
            }
            _ => out.skipped += 1,
        }
    }
    Ok(out)
}
