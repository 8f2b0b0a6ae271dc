use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Headlines,
    Subheadlines,
    CustomerReviews,
    Benefits,
    SocialProof,
    ContentBank,
}

/// How a list of values turns into section lines.
#[derive(Debug, Clone, Copy)]
pub enum LineStyle {
    /// `[<label> <i>] <text>`
    Bracketed(&'static str),
    /// `<label> <i>: <text>`
    Colon(&'static str),
    /// one raw line per item
    Raw,
}

#[derive(Debug)]
pub struct SectionSpec {
    pub kind: SectionKind,
    /// Literal line prefix that identifies the heading inside a template.
    pub heading_prefix: &'static str,
    /// Heading written when the section has to be inserted.
    pub canonical_heading: &'static str,
    pub style: LineStyle,
}

/// Optional sections, in the order they appear in a template.
pub static SECTIONS: [SectionSpec; 6] = [
    SectionSpec {
        kind: SectionKind::Headlines,
        heading_prefix: "Headlines Options:",
        canonical_heading: "Headlines Options:",
        style: LineStyle::Bracketed("Headline"),
    },
    SectionSpec {
        kind: SectionKind::Subheadlines,
        heading_prefix: "Subheadline/Explainer Options",
        canonical_heading: "Subheadline/Explainer Options (often Explainer type lines):",
        style: LineStyle::Bracketed("Subheadline"),
    },
    SectionSpec {
        kind: SectionKind::CustomerReviews,
        heading_prefix: "Customer Reviews for",
        canonical_heading: "Customer Reviews for [Angle]:",
        style: LineStyle::Raw,
    },
    SectionSpec {
        kind: SectionKind::Benefits,
        heading_prefix: "Benefits of the product",
        canonical_heading: "Benefits of the product for this angle:",
        style: LineStyle::Bracketed("Benefit"),
    },
    SectionSpec {
        kind: SectionKind::SocialProof,
        heading_prefix: "Social Proof Points",
        canonical_heading: "Social Proof Points (# of customers, PR logos, or very notable PR quotes, any other social proof points)",
        style: LineStyle::Colon("Social proof point"),
    },
    SectionSpec {
        kind: SectionKind::ContentBank,
        heading_prefix: "Content Bank - Please limit your visual recommendations",
        canonical_heading: "Content Bank - Please limit your visual recommendations to the following types of content, and anything that deviates from this list must only be very realistically accessible stock images/videos:",
        style: LineStyle::Raw,
    },
];

impl SectionKind {
    pub fn spec(self) -> &'static SectionSpec {
        &SECTIONS[self.position()]
    }

    /// Position in template order.
    pub fn position(self) -> usize {
        match self {
            SectionKind::Headlines => 0,
            SectionKind::Subheadlines => 1,
            SectionKind::CustomerReviews => 2,
            SectionKind::Benefits => 3,
            SectionKind::SocialProof => 4,
            SectionKind::ContentBank => 5,
        }
    }
}

/// Render section values into lines. Blank items are skipped and do not
/// consume a number.
pub fn render_section_values(kind: SectionKind, values: &[String]) -> Vec<String> {
    let items = values.iter().filter(|v| !v.trim().is_empty());
    match kind.spec().style {
        LineStyle::Bracketed(label) => items
            .enumerate()
            .map(|(i, text)| format!("[{} {}] {}", label, i + 1, text.trim()))
            .collect(),
        LineStyle::Colon(label) => items
            .enumerate()
            .map(|(i, text)| format!("{} {}: {}", label, i + 1, text.trim()))
            .collect(),
        // verbatim apart from trailing whitespace
        LineStyle::Raw => items.map(|text| text.trim_end().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn table_is_in_template_order() {
        for (i, spec) in SECTIONS.iter().enumerate() {
            assert_eq!(spec.kind.position(), i);
            assert!(spec.canonical_heading.starts_with(spec.heading_prefix));
        }
    }

    #[test]
    fn renders_each_style() {
        let v = strings(&["one", "two"]);
        assert_eq!(
            render_section_values(SectionKind::Headlines, &v),
            vec!["[Headline 1] one", "[Headline 2] two"]
        );
        assert_eq!(
            render_section_values(SectionKind::Subheadlines, &v),
            vec!["[Subheadline 1] one", "[Subheadline 2] two"]
        );
        assert_eq!(
            render_section_values(SectionKind::Benefits, &v),
            vec!["[Benefit 1] one", "[Benefit 2] two"]
        );
        assert_eq!(
            render_section_values(SectionKind::SocialProof, &v),
            vec!["Social proof point 1: one", "Social proof point 2: two"]
        );
        assert_eq!(render_section_values(SectionKind::ContentBank, &v), vec!["one", "two"]);
        assert_eq!(render_section_values(SectionKind::CustomerReviews, &v), vec!["one", "two"]);
    }

    #[test]
    fn blank_items_do_not_take_a_number() {
        let v = strings(&["", "  first ", "\t", "second"]);
        assert_eq!(
            render_section_values(SectionKind::Benefits, &v),
            vec!["[Benefit 1] first", "[Benefit 2] second"]
        );
        assert!(render_section_values(SectionKind::Headlines, &strings(&["", " "])).is_empty());
    }

    #[test]
    fn rendering_is_deterministic() {
        let v = strings(&["a", "b", "c"]);
        assert_eq!(
            render_section_values(SectionKind::SocialProof, &v),
            render_section_values(SectionKind::SocialProof, &v)
        );
    }
}
