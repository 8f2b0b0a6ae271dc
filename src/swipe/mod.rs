//! Swipe-file CSV: creative concepts used as a reference menu for the model.

use regex::Regex;
use std::sync::OnceLock;

use crate::errors::BriefError;

pub const REFERENCE_MENU_HEADING: &str = "Reference Menu CSV Data:";

const COL_NAME: &str = "Creative Concept Names";
const COL_DESCRIPTION: &str = "Short Description";
const COL_REQUIREMENTS: &str = "Content Requirements Per Variant";
const COL_FORMAT: &str = "Format";
const COL_IMAGE: &str = "Reference Image";
const MISSING: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeConcept {
    pub name: String,
    pub description: String,
    pub content_requirements: String,
    pub format: String,
    pub reference_image: String,
}

pub fn parse_swipe_csv(text: &str) -> Result<Vec<SwipeConcept>, BriefError> {
    let mut rows = parse_records(text)?.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| BriefError::Csv("missing header row".into()))?;
    let col = |name: &str| header.iter().position(|h| h.trim() == name);
    let (name, desc, req, fmt, img) = (
        col(COL_NAME),
        col(COL_DESCRIPTION),
        col(COL_REQUIREMENTS),
        col(COL_FORMAT),
        col(COL_IMAGE),
    );
    if [name, desc, req, fmt, img].iter().all(Option::is_none) {
        return Err(BriefError::Csv(format!(
            "no known columns in header (expected e.g. \"{COL_NAME}\")"
        )));
    }

    let concepts = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .unwrap_or(MISSING)
                    .to_string()
            };
            SwipeConcept {
                name: cell(name),
                description: cell(desc),
                content_requirements: cell(req),
                format: cell(fmt),
                reference_image: cell(img),
            }
        })
        .collect();
    Ok(concepts)
}

/// The block inserted into the prompt.
pub fn render_reference_menu(concepts: &[SwipeConcept]) -> String {
    let mut out = format!("{REFERENCE_MENU_HEADING}\n");
    for (i, c) in concepts.iter().enumerate() {
        out.push_str(&format!(
            "\nConcept {}:\n- Name: {}\n- Description: {}\n- Content Requirements: {}\n- Format: {}\n- Reference Image URL: {}\n",
            i + 1,
            c.name,
            c.description,
            c.content_requirements,
            c.format,
            c.reference_image
        ));
    }
    out
}

/// Downloadable reference image URLs, Google Drive share links rewritten.
pub fn reference_image_urls(concepts: &[SwipeConcept]) -> Vec<String> {
    concepts
        .iter()
        .map(|c| c.reference_image.as_str())
        .filter(|u| *u != MISSING && (u.starts_with("http://") || u.starts_with("https://")))
        .map(convert_drive_url)
        .collect()
}

pub fn convert_drive_url(url: &str) -> String {
    static DRIVE_ID: OnceLock<Regex> = OnceLock::new();
    if !url.contains("drive.google.com") {
        return url.to_string();
    }
    let re = DRIVE_ID.get_or_init(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").expect("valid drive id pattern"));
    match re.captures(url) {
        Some(caps) => format!("https://drive.google.com/uc?export=download&id={}", &caps[1]),
        None => url.to_string(),
    }
}

/// Quoted fields may hold commas, newlines and doubled quotes.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, BriefError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(BriefError::Csv("unterminated quoted field".into()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}
