//! Turning a cached extraction into what the user sees.
//!
//! [`render`] partitions page one's regions into three sections — tables,
//! formulas, free text — and is pure: it never calls the engine, so it can run
//! on every interaction. [`html`] turns the resulting [`ResultView`] into a
//! page.

pub mod html;

use crate::engine::{PageStructure, Region};
use crate::pipeline::{encode, tabular};
use crate::session::Extraction;
use serde::Serialize;
use tracing::{debug, warn};

/// Separator between free-text blocks.
pub const TEXT_SEPARATOR: &str = "\n\n";

/// One table ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// 1-based position in the engine's table list.
    pub number: usize,
    /// The `<table>` markup to embed.
    pub html: String,
    /// CSV download, absent when conversion failed.
    pub csv: Option<String>,
}

impl TableView {
    pub fn csv_file_name(&self) -> String {
        format!("table_{}.csv", self.number)
    }
}

/// The three result sections of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sections {
    pub tables: Vec<TableView>,
    pub formulas: Vec<String>,
    /// Free-text blocks joined by [`TEXT_SEPARATOR`]; `None` when there is none.
    pub text: Option<String>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.formulas.is_empty() && self.text.is_none()
    }
}

/// Everything needed to render one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    /// `name_size` identity of the source upload.
    pub source: String,
    /// The original image as a PNG data URI.
    pub image_data_uri: Option<String>,
    pub sections: Sections,
    /// Pretty-printed page JSON, only when the JSON view is toggled on.
    pub raw_json: Option<String>,
}

/// Partition a page's regions into tables, formulas and free text.
///
/// * Tables with empty HTML are skipped but still count towards numbering.
///   Each table gets a best-effort CSV; a conversion failure only drops the
///   download.
/// * Formulas with an empty expression are skipped.
/// * Text blocks labelled table or formula duplicate the sections above and
///   are left out; the remaining non-empty contents are joined in document
///   order.
pub fn partition(page: &PageStructure) -> Sections {
    let mut sections = Sections::default();
    let mut texts: Vec<&str> = Vec::new();
    let mut table_number = 0;

    for region in page.regions() {
        match region {
            Region::Table { html } => {
                table_number += 1;
                if html.trim().is_empty() {
                    continue;
                }
                let csv = match tabular::html_table_to_csv(html) {
                    Ok(csv) => Some(csv),
                    Err(e) => {
                        debug!("Table {}: no CSV download ({})", table_number, e);
                        None
                    }
                };
                sections.tables.push(TableView {
                    number: table_number,
                    html: tabular::table_markup(html).to_string(),
                    csv,
                });
            }
            Region::Formula { latex } => {
                let latex = latex.trim();
                if !latex.is_empty() {
                    sections.formulas.push(latex.to_string());
                }
            }
            Region::Text { label, content } => {
                if label.is_structured() {
                    continue;
                }
                let content = content.trim();
                if !content.is_empty() {
                    texts.push(content);
                }
            }
        }
    }

    if !texts.is_empty() {
        sections.text = Some(texts.join(TEXT_SEPARATOR));
    }
    sections
}

/// Build the view of a cached extraction. Never calls the engine.
pub fn render(extraction: &Extraction, show_json: bool) -> ResultView {
    let page = extraction.result().first_page();

    let sections = page.map(partition).unwrap_or_default();

    let raw_json = if show_json {
        page.and_then(|p| match serde_json::to_string_pretty(p) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Could not serialise page JSON: {}", e);
                None
            }
        })
    } else {
        None
    };

    let image_data_uri = match encode::png_data_uri(extraction.image()) {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!("Could not encode preview image: {}", e);
            None
        }
    };

    ResultView {
        source: extraction.key().to_string(),
        image_data_uri,
        sections,
        raw_json,
    }
}
