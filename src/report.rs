//! Writing an extraction to disk: `report.html`, `table_{n}.csv`, `result.json`.
//!
//! Every file is written to a temporary sibling and renamed into place, so an
//! interrupted run never leaves a half-written report behind.

use crate::session::Extraction;
use crate::view::{self, html};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files produced by [`write_report`].
#[derive(Debug, Clone, Default)]
pub struct ReportFiles {
    pub html: PathBuf,
    pub json: PathBuf,
    pub tables: Vec<PathBuf>,
}

/// Write the HTML report, one CSV per convertible table, and the raw result
/// JSON into `dir` (created if missing).
pub fn write_report(dir: &Path, extraction: &Extraction) -> io::Result<ReportFiles> {
    std::fs::create_dir_all(dir)?;

    let result_view = view::render(extraction, true);
    let page = html::page(&html::PageOptions {
        view: Some(&result_view),
        error: None,
        csv_links: html::CsvLinks::File,
        interactive: false,
    });

    let mut files = ReportFiles {
        html: dir.join("report.html"),
        json: dir.join("result.json"),
        tables: Vec::new(),
    };
    write_atomic(&files.html, page.as_bytes())?;

    let json = serde_json::to_string_pretty(extraction.result())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_atomic(&files.json, json.as_bytes())?;

    for table in &result_view.sections.tables {
        if let Some(csv) = &table.csv {
            let path = dir.join(table.csv_file_name());
            write_atomic(&path, csv.as_bytes())?;
            files.tables.push(path);
        }
    }

    info!(
        "Report written to {} ({} CSV file(s))",
        dir.display(),
        files.tables.len()
    );
    Ok(files)
}

fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}
