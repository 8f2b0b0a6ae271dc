//! Prompt assembly: placeholder substitution plus optional-section editing
//! over a template document.

pub mod index;
pub mod sections;

use fs_err as fs;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use crate::campaign::BuildRequest;
use crate::config::{Config, SectionLimits};
use crate::errors::BriefError;
use crate::swipe;
use index::TemplateIndex;
use sections::{render_section_values, SECTIONS};

/// Start of the sentence after which the swipe CSV block goes.
pub const CSV_MARKER: &str = "Also attached is a CSV file for the Reference Menu";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern"))
}

fn blank_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid newline pattern"))
}

/// Fully resolved text handed to the model, plus the reference image URLs
/// of the swipe CSV it embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    reference_images: Vec<String>,
}

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn reference_images(&self) -> &[String] {
        &self.reference_images
    }

    #[cfg(test)]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One change against the base document. An empty range is an insertion.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    text: String,
}

impl Edit {
    fn insert(at: usize, text: String) -> Self {
        Self { range: at..at, text }
    }

    fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateAssembler {
    limits: SectionLimits,
    boundaries: Vec<String>,
}

impl TemplateAssembler {
    pub fn new(limits: SectionLimits, boundaries: Vec<String>) -> Self {
        Self { limits, boundaries }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.limits.clone(), cfg.boundary_headings.clone())
    }

    /// Read the template fresh and assemble it.
    pub fn build_prompt(&self, template_path: &Path, request: &BuildRequest) -> Result<Prompt, BriefError> {
        let template = fs::read_to_string(template_path).map_err(|source| BriefError::TemplateRead {
            path: template_path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %template_path.display(), bytes = template.len(), "loaded template");
        self.assemble(&template, request)
    }

    pub fn assemble(&self, template: &str, request: &BuildRequest) -> Result<Prompt, BriefError> {
        let base = template.replace("\r\n", "\n");
        let index = TemplateIndex::scan(&base, &self.boundaries);

        let mut edits: Vec<Edit> = Vec::new();
        let mut appended: Vec<String> = Vec::new();

        for spec in SECTIONS.iter() {
            let mut values = request.section_values(spec.kind).to_vec();
            values.retain(|v| !v.trim().is_empty());
            if let Some(limit) = self.limits.get(spec.kind) {
                values.truncate(limit);
            }
            let lines = render_section_values(spec.kind, &values);

            let mut spans = index.sections(spec.kind);
            let first = spans.next();
            // repeated headings never survive with stale content
            for dup in spans {
                tracing::debug!(section = ?spec.kind, at = dup.line_start, "removing repeated section");
                edits.push(Edit { range: dup.whole(), text: String::new() });
            }

            match (first, lines.is_empty()) {
                (Some(span), true) => {
                    tracing::debug!(section = ?spec.kind, "removing empty section");
                    edits.push(Edit { range: span.whole(), text: String::new() });
                }
                (None, true) => {}
                (Some(span), false) => {
                    let body = replacement_body(&base[span.body()], &lines);
                    let needs_newline = !base[..span.body_start].ends_with('\n');
                    let text = if needs_newline { format!("\n{body}") } else { body };
                    edits.push(Edit { range: span.body(), text });
                }
                (None, false) => {
                    let block = format!("{}\n{}\n\n", spec.canonical_heading, lines.join("\n"));
                    match index.anchor_after(spec.kind) {
                        Some(at) => {
                            tracing::debug!(section = ?spec.kind, at, "inserting section before anchor");
                            edits.push(Edit::insert(at, block));
                        }
                        None => {
                            tracing::debug!(section = ?spec.kind, "no anchor, appending section");
                            appended.push(block);
                        }
                    }
                }
            }
        }

        let mut reference_images = Vec::new();
        if let Some(csv) = request.csv_data.as_deref().filter(|c| !c.trim().is_empty()) {
            let concepts = swipe::parse_swipe_csv(csv)?;
            reference_images = swipe::reference_image_urls(&concepts);
            let block = swipe::render_reference_menu(&concepts);
            match csv_insertion_point(&base, &edits) {
                Some(at) => edits.push(Edit::insert(at, format!("\n\n{block}\n"))),
                None => {
                    tracing::debug!("csv marker not found, appending reference menu");
                    appended.push(block);
                }
            }
        }

        // stable: inserts sharing an offset keep section order and precede
        // a removal that starts there
        edits.sort_by_key(|e| (e.range.start, !e.is_insert()));

        let scalars = request.scalars();
        let mut unresolved = BTreeSet::new();
        let mut out = String::with_capacity(base.len());
        let mut cursor = 0usize;
        for edit in &edits {
            if edit.range.start > cursor {
                out.push_str(&substitute(&base[cursor..edit.range.start], &scalars, &mut unresolved));
                cursor = edit.range.start;
            }
            out.push_str(&edit.text);
            cursor = cursor.max(edit.range.end);
        }
        out.push_str(&substitute(&base[cursor..], &scalars, &mut unresolved));

        for block in appended {
            out.push_str("\n\n");
            out.push_str(&block);
        }

        if !unresolved.is_empty() {
            tracing::warn!(placeholders = ?unresolved, "template placeholders left unresolved");
        }

        Ok(Prompt { text: normalize(&out), reference_images })
    }
}

/// New body for a kept heading: rendered lines followed by the old body's
/// trailing whitespace, so the spacing before the next heading survives.
fn replacement_body(old: &str, lines: &[String]) -> String {
    let tail = &old[old.trim_end().len()..];
    let tail = if tail.contains('\n') { tail } else { "\n" };
    format!("{}{}", lines.join("\n"), tail)
}

/// End of the marker sentence, unless that text is being removed or rewritten.
fn csv_insertion_point(base: &str, edits: &[Edit]) -> Option<usize> {
    let start = base.find(CSV_MARKER)?;
    let rest = &base[start..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    let at = start + sentence_end(&rest[..line_end]);
    let touched = edits
        .iter()
        .any(|e| !e.is_insert() && e.range.start <= start && at <= e.range.end);
    (!touched).then_some(at)
}

/// Byte offset just past the first full stop on `line`. A full stop is a
/// `.` followed by whitespace or the end of the line that does not close a
/// dotted abbreviation such as "e.g.". Falls back to the end of the line.
fn sentence_end(line: &str) -> usize {
    for (i, _) in line.match_indices('.') {
        if line[i + 1..].chars().next().is_some_and(|c| !c.is_whitespace()) {
            continue;
        }
        let word_start = line[..i].rfind(char::is_whitespace).map_or(0, |w| w + 1);
        if line[word_start..i].contains('.') {
            continue;
        }
        return i + 1;
    }
    line.len()
}

fn substitute(text: &str, scalars: &[(&'static str, String)], unresolved: &mut BTreeSet<String>) -> String {
    placeholder_re()
        .replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            match scalars.iter().find(|(name, _)| *name == key) {
                Some((_, value)) => value.clone(),
                None => {
                    unresolved.insert(key.to_string());
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn normalize(text: &str) -> String {
    blank_run_re().replace_all(text, "\n\n").trim().to_string()
}
