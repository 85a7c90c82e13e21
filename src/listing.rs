use std::io::Write;

use serde::Serialize;
use terminal_size::{Width as TermWidth, terminal_size};

use crate::error::AppError;
use crate::process::{ProcessManager, ProcessRecord};
use crate::request::OutputFormat;

const BANNER: &str = "       PSN   PID TYPE CREA NAME                ";
const DEFAULT_TERMINAL_WIDTH: usize = 80;
const MIN_PATH_WIDTH: usize = 4;

/// Width of the controlling terminal, if there is one. stdout is tried first,
/// then stderr and stdin, so a piped listing still fits the terminal.
pub fn terminal_width() -> Option<usize> {
    terminal_size()
        .map(|(TermWidth(width), _)| width as usize)
        .filter(|width| *width > 0)
}

#[derive(Serialize)]
struct ListEntry {
    psn: String,
    pid: i32,
    #[serde(rename = "type")]
    file_type: String,
    creator: String,
    name: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_id: Option<String>,
}

/// Writes one line per matching process, table or JSON.
pub struct Listing {
    long: bool,
    format: OutputFormat,
    path_width: Option<usize>,
    entries: Vec<ListEntry>,
}

impl Listing {
    pub fn new(long: bool, format: OutputFormat, terminal_width: Option<usize>) -> Self {
        let width = terminal_width.unwrap_or(DEFAULT_TERMINAL_WIDTH);
        let path_width = width
            .checked_sub(BANNER.len() + 1)
            .filter(|w| *w >= MIN_PATH_WIDTH);
        Self {
            long,
            format,
            path_width,
            entries: Vec::new(),
        }
    }

    pub fn header(&self, out: &mut dyn Write) -> Result<(), AppError> {
        if self.format == OutputFormat::Table {
            if self.long {
                writeln!(out, "{BANNER} PATH (bundle identifier)")?;
            } else {
                writeln!(out, "{BANNER} PATH")?;
            }
        }
        Ok(())
    }

    pub fn row(
        &mut self,
        record: &ProcessRecord,
        manager: &dyn ProcessManager,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let bundle_id = if self.long {
            record
                .bundle_identifier(manager)
                .map_err(|err| {
                    tracing::debug!("bundle lookup failed: {err:#}");
                    AppError::BundleLocation {
                        name: record.name.clone(),
                        handle: record.handle,
                        pid: record.pid,
                    }
                })?
                .map(str::to_string)
        } else {
            None
        };

        match self.format {
            OutputFormat::Table => self.write_row(record, bundle_id.as_deref(), out),
            OutputFormat::Json => {
                self.entries.push(ListEntry {
                    psn: record.handle.to_string(),
                    pid: record.pid,
                    file_type: record.file_type.to_string(),
                    creator: record.creator.to_string(),
                    name: record.name.clone(),
                    path: record.path.display().to_string(),
                    bundle_id,
                });
                Ok(())
            }
        }
    }

    fn write_row(
        &self,
        record: &ProcessRecord,
        bundle_id: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let handle = record.handle;
        write!(
            out,
            "{:>8}.{} {:>5} {} {} {:<20.20}",
            handle.hi(),
            handle.lo(),
            record.pid,
            record.file_type,
            record.creator,
            record.name
        )?;

        let path = record.path.display().to_string();
        match self.path_width {
            Some(width) if !self.long => write!(out, " {path:<width$.width$}")?,
            _ => write!(out, " {path}")?,
        }
        if let Some(id) = bundle_id {
            write!(out, " ({id})")?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub fn finish(self, out: &mut dyn Write) -> Result<(), AppError> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, &self.entries).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        Ok(())
    }
}
