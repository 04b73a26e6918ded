// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-page HTML report collecting the demo charts.

use std::fmt::Write as _;

#[derive(Debug)]
pub(crate) struct HtmlSection {
    pub(crate) title: String,
    pub(crate) notes: Vec<String>,
    pub(crate) svgs: Vec<String>,
}

impl HtmlSection {
    pub(crate) fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: Vec::new(),
            svgs: Vec::new(),
        }
    }

    pub(crate) fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub(crate) fn svg(mut self, svg: String) -> Self {
        self.svgs.push(svg);
        self
    }
}

pub(crate) fn render_report(title: &str, sections: &[HtmlSection]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>"
    );
    out.push_str(
        "<style>body{font-family:sans-serif;margin:2em}section{margin-bottom:3em}\
         .charts{display:flex;flex-wrap:wrap;gap:2em;align-items:flex-start}</style>\n",
    );
    let _ = writeln!(out, "</head><body><h1>{title}</h1>");
    for section in sections {
        let _ = writeln!(out, "<section><h2>{}</h2>", section.title);
        for note in &section.notes {
            let _ = writeln!(out, "<p>{note}</p>");
        }
        out.push_str("<div class=\"charts\">\n");
        for svg in &section.svgs {
            out.push_str(svg);
        }
        out.push_str("</div></section>\n");
    }
    out.push_str("</body></html>\n");
    out
}
