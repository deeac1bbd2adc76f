//! Structured output of the document-structure engine.
//!
//! The field names follow the engine's wire format (`table_res_list`,
//! `pred_html`, `block_label`, …) so a page can be deserialised directly from
//! its JSON. Fields the scanner does not interpret are kept in `extra` and
//! show up unchanged in the raw JSON view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One recognised table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// HTML rendering of the table (`<table>…</table>`, possibly wrapped in
    /// `<html><body>`).
    #[serde(default)]
    pub pred_html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One recognised formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaEntry {
    /// LaTeX source of the formula.
    #[serde(default)]
    pub rec_formula: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Layout label of a parsed block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockLabel {
    Text,
    Title,
    DocTitle,
    ParagraphTitle,
    Table,
    Formula,
    FormulaNumber,
    Figure,
    Header,
    Footer,
    Other(String),
}

impl BlockLabel {
    /// Blocks with these labels belong to a table or a formula (including
    /// captions and equation numbers such as `table_title`, `formula_number`)
    /// and stay out of the free text.
    pub fn is_structured(&self) -> bool {
        match self {
            BlockLabel::Table | BlockLabel::Formula | BlockLabel::FormulaNumber => true,
            BlockLabel::Other(s) => {
                let s = s.trim().to_ascii_lowercase();
                s.starts_with("table") || s.starts_with("formula")
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockLabel::Text => "text",
            BlockLabel::Title => "title",
            BlockLabel::DocTitle => "doc_title",
            BlockLabel::ParagraphTitle => "paragraph_title",
            BlockLabel::Table => "table",
            BlockLabel::Formula => "formula",
            BlockLabel::FormulaNumber => "formula_number",
            BlockLabel::Figure => "figure",
            BlockLabel::Header => "header",
            BlockLabel::Footer => "footer",
            BlockLabel::Other(s) => s,
        }
    }
}

impl From<String> for BlockLabel {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => BlockLabel::Text,
            "title" => BlockLabel::Title,
            "doc_title" => BlockLabel::DocTitle,
            "paragraph_title" => BlockLabel::ParagraphTitle,
            "table" => BlockLabel::Table,
            "formula" | "display_formula" | "inline_formula" | "equation" => BlockLabel::Formula,
            "formula_number" => BlockLabel::FormulaNumber,
            "figure" | "image" | "chart" => BlockLabel::Figure,
            "header" => BlockLabel::Header,
            "footer" => BlockLabel::Footer,
            _ => BlockLabel::Other(s),
        }
    }
}

impl From<&str> for BlockLabel {
    fn from(s: &str) -> Self {
        BlockLabel::from(s.to_string())
    }
}

impl From<BlockLabel> for String {
    fn from(label: BlockLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for BlockLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block of the page's reading-order parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBlock {
    #[serde(alias = "label")]
    pub block_label: BlockLabel,
    #[serde(default, alias = "content")]
    pub block_content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParsedBlock {
    pub fn new(label: impl Into<BlockLabel>, content: impl Into<String>) -> Self {
        Self {
            block_label: label.into(),
            block_content: content.into(),
            extra: Map::new(),
        }
    }
}

/// Everything the engine recognised on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStructure {
    #[serde(default)]
    pub table_res_list: Vec<TableEntry>,
    #[serde(default)]
    pub formula_res_list: Vec<FormulaEntry>,
    #[serde(default)]
    pub parsing_res_list: Vec<ParsedBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageStructure {
    /// All regions of the page: tables, then formulas, then parsed blocks in
    /// reading order.
    pub fn regions(&self) -> Vec<Region<'_>> {
        let tables = self
            .table_res_list
            .iter()
            .map(|t| Region::Table { html: &t.pred_html });
        let formulas = self
            .formula_res_list
            .iter()
            .map(|f| Region::Formula { latex: &f.rec_formula });
        let blocks = self.parsing_res_list.iter().map(|b| Region::Text {
            label: &b.block_label,
            content: &b.block_content,
        });
        tables.chain(formulas).chain(blocks).collect()
    }
}

/// One classified piece of a page's layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region<'a> {
    Table { html: &'a str },
    Formula { latex: &'a str },
    Text { label: &'a BlockLabel, content: &'a str },
}

/// The engine's output for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    pub pages: Vec<PageStructure>,
}

impl ExtractionResult {
    pub fn new(pages: Vec<PageStructure>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The page the scanner renders. Only single-page input is processed.
    pub fn first_page(&self) -> Option<&PageStructure> {
        self.pages.first()
    }
}
