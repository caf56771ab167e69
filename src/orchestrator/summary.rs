//! End-of-run summary.

use crate::db::ExecutionReport;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub command: String,
    pub statements: usize,
    pub rows_affected: u64,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub ended_utc: chrono::DateTime<chrono::Utc>,
    pub notes: Vec<String>,
}

impl RunSummary {
    pub fn start(command: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            command: command.to_string(),
            statements: 0,
            rows_affected: 0,
            started_utc: now,
            ended_utc: now,
            notes: Vec::new(),
        }
    }

    pub fn record(&mut self, report: &ExecutionReport) {
        self.statements += report.statements;
        self.rows_affected += report.rows_affected;
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn finish(mut self) -> Self {
        self.ended_utc = chrono::Utc::now();
        self
    }

    pub fn duration_secs(&self) -> f64 {
        (self.ended_utc - self.started_utc).num_milliseconds() as f64 / 1000.0
    }

    pub fn log(&self) {
        log::info!(
            "{} finished: {} statements, {} rows affected, {:.1}s ({} -> {})",
            self.command,
            self.statements,
            self.rows_affected,
            self.duration_secs(),
            self.started_utc.format("%Y-%m-%d %H:%M:%S"),
            self.ended_utc.format("%Y-%m-%d %H:%M:%S"),
        );
        for note in &self.notes {
            log::info!("  - {}", note);
        }
    }
}
