//! Document structure walker
//!
//! Visits every text-bearing container in a fixed order: the body, the
//! footnotes, the headers and then the footers. Inside a container the
//! paragraphs come first, then the tables; tables are walked row by row and
//! cell by cell, each cell being a container again.

use crate::model::{BlockContainer, TemplateDocument, TextParagraph, TextRun, TextTable};
use crate::rewriter::rewrite;
use crate::substitution::RuleSet;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::trace;

/// Counts collected during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    pub paragraphs: usize,
    pub fragments: usize,
    pub rewritten: usize,
}

/// Rewrite every fragment of `document` with `rules`
pub fn walk<D: TemplateDocument>(document: &mut D, rules: &RuleSet) -> WalkStats {
    let mut stats = WalkStats::default();

    visit_container(document.body_mut(), rules, &mut stats);
    for footnote in document.footnotes_mut() {
        visit_container(footnote, rules, &mut stats);
    }
    for header in document.headers_mut() {
        visit_container(header, rules, &mut stats);
    }
    for footer in document.footers_mut() {
        visit_container(footer, rules, &mut stats);
    }

    stats
}

fn visit_container<C: BlockContainer>(container: &mut C, rules: &RuleSet, stats: &mut WalkStats) {
    for paragraph in container.paragraphs_mut() {
        visit_paragraph(paragraph, rules, stats);
    }
    for table in container.tables_mut() {
        visit_table(table, rules, stats);
    }
}

fn visit_table<T: TextTable>(table: &mut T, rules: &RuleSet, stats: &mut WalkStats) {
    for row in 0..table.row_count() {
        let Some(cells) = table.row_cells_mut(row) else {
            continue;
        };
        for cell in cells {
            visit_container(cell, rules, stats);
        }
    }
}

fn visit_paragraph<P: TextParagraph>(paragraph: &mut P, rules: &RuleSet, stats: &mut WalkStats) {
    stats.paragraphs += 1;
    for run in paragraph.runs_mut() {
        visit_run(run, rules, stats);
    }
}

fn visit_run<R: TextRun>(run: &mut R, rules: &RuleSet, stats: &mut WalkStats) {
    for index in 0..run.fragment_count() {
        stats.fragments += 1;
        let rewritten = match run.fragment(index) {
            Some(text) => match rewrite(text, rules) {
                Cow::Owned(new) if new != text => Some(new),
                _ => None,
            },
            None => None,
        };
        if let Some(new) = rewritten {
            trace!(fragment = index, text = %new, "rewrote fragment");
            run.set_fragment(index, new);
            stats.rewritten += 1;
        }
    }
}
