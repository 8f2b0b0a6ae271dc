use chrono::Utc;
use fs_err as fs;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::brief::Brief;
use crate::prompt::Prompt;

#[derive(Debug)]
pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: Option<PathBuf>,
    pub brief: Option<PathBuf>,
    pub text: Option<PathBuf>,
    /// Image that went out with the prompt.
    pub reference_image: Option<PathBuf>,
}

pub fn run_dir(root: &Path, run: Uuid) -> PathBuf {
    root.join(format!("{}-{}", Utc::now().format("%Y%m%d-%H%M%S"), run))
}

pub fn save_prompt(dir: &Path, prompt: &Prompt) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let p = dir.join("prompt.md");
    fs::write(&p, prompt.as_str())?;
    Ok(p)
}

pub fn save_brief(dir: &Path, brief: &Brief, with_prompt: bool, with_text: bool) -> anyhow::Result<SavedPaths> {
    fs::create_dir_all(dir)?;

    let prompt = if with_prompt {
        Some(save_prompt(dir, &brief.prompt)?)
    } else {
        None
    };

    let md = dir.join("brief.md");
    fs::write(&md, &brief.text)?;

    let text = if with_text {
        let p = dir.join("brief.txt");
        fs::write(&p, markdown_to_text(&brief.text))?;
        Some(p)
    } else {
        None
    };

    Ok(SavedPaths {
        dir: dir.to_path_buf(),
        prompt,
        brief: Some(md),
        text,
        reference_image: brief.image.clone(),
    })
}

/// Plain-text rendering: heading markers, emphasis and code ticks removed.
pub fn markdown_to_text(md: &str) -> String {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    static EMPHASIS: OnceLock<Regex> = OnceLock::new();
    let heading = HEADING.get_or_init(|| Regex::new(r"(?m)^#{1,6}[ \t]*").expect("valid heading pattern"));
    let emphasis =
        EMPHASIS.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__|`([^`]*)`").expect("valid emphasis pattern"));

    let text = heading.replace_all(md, "");
    emphasis.replace_all(&text, "$1$2$3").into_owned()
}
