//! Template Expander
//!
//! Fills placeholders in Word templates. A [`RuleSet`] lists regular
//! expressions and their replacements; [`TemplateProcessor`] applies them to
//! the text of every run in the body, table cells, footnotes, headers and
//! footers, and writes the resulting package.
//!
//! # Features
//!
//! - Ordered rules: each rule sees the output of the rules before it
//! - Capture groups in replacements (`$1`, `${name}`; `$$` for a dollar sign)
//! - Rules loadable from JSON files
//! - Parts without changes are copied into the output byte for byte
//! - Output written through a temporary file, so a failed run never leaves a
//!   partial destination behind
//!
//! Each `w:t` fragment is rewritten on its own: a placeholder that Word split
//! across two fragments is not recognised.
//!
//! # Example
//!
//! ```rust,no_run
//! use template_expander::{RuleSet, SubstitutionRule, TemplateProcessor};
//!
//! let rules = RuleSet::new()
//!     .with_rule(SubstitutionRule::literal("{{NAME}}", "Ada Lovelace")?)
//!     .with_rule(SubstitutionRule::new(r"\{\{DATE\}\}", "1843-07-10")?);
//!
//! let report = TemplateProcessor::from_path("letter.docx")?.process(&rules, "letter-filled.docx")?;
//! assert!(report.rewritten_fragments <= report.fragments);
//! # Ok::<(), template_expander::ExpanderError>(())
//! ```

mod error;
mod ooxml;
mod rewriter;
mod substitution;
pub mod engine;
pub mod model;
pub mod walker;

// Re-export main types
pub use engine::{ProcessReport, TemplateProcessor};
pub use error::{BoxError, ErrorKind, ExpanderError, Result};
pub use rewriter::rewrite;
pub use substitution::{RuleEntry, RuleSet, SubstitutionRule};
pub use walker::{walk, WalkStats};
