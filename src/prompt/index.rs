use std::ops::Range;

use super::sections::{SectionKind, SECTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Section(SectionKind),
    /// Heading that only terminates the section before it.
    Boundary,
}

/// One recognized heading and the region it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingSpan {
    pub kind: HeadingKind,
    pub line_start: usize,
    /// First byte after the heading line (including its newline).
    pub body_start: usize,
    /// Start of the next recognized heading, or the end of the document.
    pub end: usize,
}

impl HeadingSpan {
    pub fn whole(&self) -> Range<usize> {
        self.line_start..self.end
    }

    pub fn body(&self) -> Range<usize> {
        self.body_start..self.end
    }
}

/// All recognized headings of a document, located in a single pass in
/// document order. Spans never overlap.
#[derive(Debug, Default)]
pub struct TemplateIndex {
    spans: Vec<HeadingSpan>,
}

impl TemplateIndex {
    pub fn scan(text: &str, boundaries: &[String]) -> Self {
        let mut spans: Vec<HeadingSpan> = Vec::new();
        let mut offset = 0usize;

        for line in text.split_inclusive('\n') {
            if let Some(kind) = classify(line, boundaries) {
                if let Some(prev) = spans.last_mut() {
                    prev.end = offset;
                }
                spans.push(HeadingSpan {
                    kind,
                    line_start: offset,
                    body_start: offset + line.len(),
                    end: text.len(),
                });
            }
            offset += line.len();
        }

        Self { spans }
    }

    #[cfg(test)]
    pub fn spans(&self) -> &[HeadingSpan] {
        &self.spans
    }

    /// Every occurrence of a section heading, in document order.
    pub fn sections(&self, kind: SectionKind) -> impl Iterator<Item = &HeadingSpan> + '_ {
        self.spans
            .iter()
            .filter(move |s| s.kind == HeadingKind::Section(kind))
    }

    /// Offset of the earliest heading that logically follows `kind`, used as
    /// the insertion point for a section missing from the document.
    pub fn anchor_after(&self, kind: SectionKind) -> Option<usize> {
        self.spans
            .iter()
            .find(|s| match s.kind {
                HeadingKind::Section(other) => other.position() > kind.position(),
                HeadingKind::Boundary => true,
            })
            .map(|s| s.line_start)
    }
}

fn classify(line: &str, boundaries: &[String]) -> Option<HeadingKind> {
    if let Some(spec) = SECTIONS.iter().find(|s| line.starts_with(s.heading_prefix)) {
        return Some(HeadingKind::Section(spec.kind));
    }
    boundaries
        .iter()
        .any(|b| !b.is_empty() && line.starts_with(b.as_str()))
        .then_some(HeadingKind::Boundary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Intro {brand_name}\n\nHeadlines Options:\nold one\n\nold two\n\nBenefits of the product:\nb\nAI Prompt Output:\nrest\n";

    fn boundaries() -> Vec<String> {
        vec!["AI Prompt Output".to_string()]
    }

    #[test]
    fn finds_headings_in_document_order() {
        let idx = TemplateIndex::scan(DOC, &boundaries());
        let kinds: Vec<_> = idx.spans().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                HeadingKind::Section(SectionKind::Headlines),
                HeadingKind::Section(SectionKind::Benefits),
                HeadingKind::Boundary,
            ]
        );
    }

    #[test]
    fn body_runs_to_next_heading_across_blank_lines() {
        let idx = TemplateIndex::scan(DOC, &boundaries());
        let h = idx.sections(SectionKind::Headlines).next().unwrap();
        assert_eq!(&DOC[h.body()], "old one\n\nold two\n\n");
        let b = idx.sections(SectionKind::Benefits).next().unwrap();
        assert_eq!(&DOC[b.whole()], "Benefits of the product:\nb\n");
    }

    #[test]
    fn last_section_runs_to_end_of_document() {
        let doc = "Social Proof Points (x)\nfirst\n\nsecond";
        let idx = TemplateIndex::scan(doc, &[]);
        let s = idx.sections(SectionKind::SocialProof).next().unwrap();
        assert_eq!(s.end, doc.len());
        assert_eq!(&doc[s.body()], "first\n\nsecond");
    }

    #[test]
    fn repeated_headings_are_all_listed() {
        let doc = "Benefits of the product:\na\n\nIntro\nBenefits of the product (again):\nb\n";
        let idx = TemplateIndex::scan(doc, &[]);
        let bodies: Vec<&str> = idx.sections(SectionKind::Benefits).map(|s| &doc[s.body()]).collect();
        assert_eq!(bodies, vec!["a\n\nIntro\n", "b\n"]);
    }

    #[test]
    fn heading_must_start_the_line() {
        let doc = "See the Headlines Options: below\n";
        assert!(TemplateIndex::scan(doc, &[]).spans().is_empty());
    }

    #[test]
    fn anchor_is_earliest_later_heading() {
        let idx = TemplateIndex::scan(DOC, &boundaries());
        let benefits = idx.sections(SectionKind::Benefits).next().unwrap().line_start;
        assert_eq!(idx.anchor_after(SectionKind::Subheadlines), Some(benefits));
        let boundary = idx.spans()[2].line_start;
        assert_eq!(idx.anchor_after(SectionKind::SocialProof), Some(boundary));
    }

    #[test]
    fn no_anchor_without_later_headings() {
        let idx = TemplateIndex::scan("Headlines Options:\nx\n", &[]);
        assert_eq!(idx.anchor_after(SectionKind::ContentBank), None);
    }
}
