//! HTML page rendering for the web UI and the `scan` report.
//!
//! Table markup comes from the engine and is embedded as-is (only the
//! `<table>` element); every other piece of engine output is escaped.
//! Formulas are emitted as `\[ … \]` display math for MathJax.

use super::ResultView;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

const TITLE: &str = "Scan &amp; Extract";
const SUBTITLE: &str =
    "Upload any document or image to extract text, tables, and formulas instantly.";
const SUPPORTED: &str = "Supported formats: PNG, JPG, PDF";

const STYLE: &str = r#"
    html, body { font-family: 'Inter', system-ui, sans-serif; background: #ffffff; color: #111827; }
    main { max-width: 760px; margin: 2rem auto; padding: 0 1rem; }
    h1 { font-weight: 600; text-align: center; margin-bottom: 0.5rem; }
    .subtitle { color: #6B7280; text-align: center; font-size: 1.1rem; margin-bottom: 3rem; }
    .info { background: #EFF6FF; color: #1E3A8A; padding: 0.75rem 1rem; border-radius: 0.5rem; }
    .error { background: #FEF2F2; color: #991B1B; padding: 0.75rem 1rem; border-radius: 0.5rem; white-space: pre-wrap; }
    .upload { display: flex; gap: 0.5rem; justify-content: center; margin-bottom: 2rem; }
    figure { margin: 0 0 2rem 0; text-align: center; }
    figure img { max-width: 100%; }
    figcaption { color: #6B7280; font-size: 0.9rem; }
    table { border-collapse: collapse; margin: 0.5rem 0; }
    td, th { border: 1px solid #D1D5DB; padding: 0.25rem 0.5rem; }
    .download { display: inline-block; margin-bottom: 1.5rem; }
    .formula { margin: 1rem 0; overflow-x: auto; }
    textarea { width: 100%; height: 300px; font-family: inherit; }
    pre.json { background: #F9FAFB; padding: 1rem; overflow-x: auto; }
"#;

const MATHJAX: &str =
    r#"<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js"></script>"#;

/// Where "Download Table n (CSV)" links point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLinks {
    /// `/tables/{n}/csv` on the web server.
    Route,
    /// `table_{n}.csv` next to a written report.
    File,
}

/// What to put on a page.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions<'a> {
    pub view: Option<&'a ResultView>,
    pub error: Option<&'a str>,
    pub csv_links: CsvLinks,
    /// Show the upload form and JSON toggle (web UI only).
    pub interactive: bool,
}

/// Render a complete HTML document.
pub fn page(opts: &PageOptions<'_>) -> String {
    let mut out = String::with_capacity(8 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{TITLE}</title>\n<style>{STYLE}</style>\n{MATHJAX}\n</head>\n<body>\n<main>\n\
         <h1>{TITLE}</h1>\n<p class=\"subtitle\">{SUBTITLE}</p>\n"
    );

    if opts.interactive {
        out.push_str(
            "<form class=\"upload\" action=\"/scan\" method=\"post\" enctype=\"multipart/form-data\">\n\
             <input type=\"file\" name=\"file\" accept=\".png,.jpg,.jpeg,.pdf,image/png,image/jpeg,application/pdf\" required>\n\
             <button type=\"submit\">Scan</button>\n</form>\n",
        );
    }

    if let Some(err) = opts.error {
        let _ = writeln!(out, "<div class=\"error\">{}</div>", encode_text(err));
    } else if let Some(view) = opts.view {
        results(&mut out, view, opts);
    } else {
        let _ = writeln!(out, "<div class=\"info\">{SUPPORTED}</div>");
    }

    out.push_str("</main>\n</body>\n</html>\n");
    out
}

fn results(out: &mut String, view: &ResultView, opts: &PageOptions<'_>) {
    if let Some(uri) = &view.image_data_uri {
        let _ = writeln!(
            out,
            "<figure><img src=\"{}\" alt=\"{}\"><figcaption>Original Document</figcaption></figure>",
            encode_double_quoted_attribute(uri),
            encode_double_quoted_attribute(&view.source)
        );
    }

    out.push_str("<h3>Results</h3>\n");
    let sections = &view.sections;

    for table in &sections.tables {
        let _ = writeln!(
            out,
            "<section class=\"table\">\n<p><strong>Table {}</strong></p>\n{}",
            table.number, table.html
        );
        if table.csv.is_some() {
            let href = match opts.csv_links {
                CsvLinks::Route => format!("/tables/{}/csv", table.number),
                CsvLinks::File => table.csv_file_name(),
            };
            let _ = writeln!(
                out,
                "<p><a class=\"download\" href=\"{}\" download=\"{}\">Download Table {} (CSV)</a></p>",
                encode_double_quoted_attribute(&href),
                table.csv_file_name(),
                table.number
            );
        }
        out.push_str("</section>\n");
    }

    for latex in &sections.formulas {
        let _ = writeln!(out, "<div class=\"formula\">\\[{}\\]</div>", encode_text(latex));
    }

    if let Some(text) = &sections.text {
        let _ = writeln!(
            out,
            "<p><strong>Extracted Text</strong></p>\n<textarea readonly>{}</textarea>",
            encode_text(text)
        );
    }

    if opts.interactive {
        let (href, label) = if view.raw_json.is_some() {
            ("/", "Hide JSON Output")
        } else {
            ("/?json=1", "Show JSON Output")
        };
        let _ = writeln!(out, "<p><a class=\"toggle\" href=\"{href}\">{label}</a></p>");
    }

    if let Some(json) = &view.raw_json {
        let _ = writeln!(out, "<pre class=\"json\">{}</pre>", encode_text(json));
    }
}
