use anyhow::Context;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{CampaignType, ProviderKind};
use crate::errors::BriefError;
use crate::prompt::sections::SectionKind;

pub const DEFAULT_CONFIG_FILE: &str = "creative_brief.toml";

/// Maximum items rendered per section; `None` keeps every item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionLimits {
    pub headlines: Option<usize>,
    pub subheadlines: Option<usize>,
    pub customer_reviews: Option<usize>,
    pub benefits: Option<usize>,
    pub social_proof: Option<usize>,
    pub content_bank: Option<usize>,
}

impl SectionLimits {
    pub fn get(&self, kind: SectionKind) -> Option<usize> {
        match kind {
            SectionKind::Headlines => self.headlines,
            SectionKind::Subheadlines => self.subheadlines,
            SectionKind::CustomerReviews => self.customer_reviews,
            SectionKind::Benefits => self.benefits,
            SectionKind::SocialProof => self.social_proof,
            SectionKind::ContentBank => self.content_bank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Fixed pause between attempts. Zero means retry immediately.
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3, delay_ms: 0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub template_dir: String,
    pub evergreen_template: String,
    pub promo_template: String,
    pub output_dir: String,
    pub image_cache_dir: String,
    pub provider: ProviderKind,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub openai_url: String,
    pub anthropic_url: String,
    pub ollama_url: String,
    pub retry: RetryConfig,
    pub limits: SectionLimits,
    /// Headings that end an optional section without being one.
    pub boundary_headings: Vec<String>,
    pub save_prompt: bool,
    pub export_txt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: "templates".into(),
            evergreen_template: "evergreen_template.txt".into(),
            promo_template: "promo_template.txt".into(),
            output_dir: "outputs/briefs".into(),
            image_cache_dir: "data/processed/images".into(),
            provider: ProviderKind::OpenAI,
            model: "gpt-4.1-mini".into(),
            max_tokens: 8192,
            timeout_secs: 600,
            openai_url: "https://api.openai.com".into(),
            anthropic_url: "https://api.anthropic.com".into(),
            ollama_url: "http://localhost:11434".into(),
            retry: RetryConfig::default(),
            limits: SectionLimits::default(),
            boundary_headings: vec![
                "AI Prompt Output".into(),
                "Reference Menu CSV Data:".into(),
            ],
            save_prompt: true,
            export_txt: false,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self, BriefError> {
        toml::from_str(s).map_err(|e| BriefError::Config(e.to_string()))
    }

    /// Explicit path must exist; otherwise `creative_brief.toml` in the
    /// working directory is used when present, defaults when not.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.is_file() {
                    return Ok(Self::default());
                }
                p
            }
        };
        let s = fs::read_to_string(&path)?;
        Self::from_toml(&s).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn template_path(&self, campaign: CampaignType) -> PathBuf {
        let file = match campaign {
            CampaignType::Evergreen => &self.evergreen_template,
            CampaignType::Promo => &self.promo_template,
        };
        Path::new(&self.template_dir).join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.delay_ms, 0);
        assert_eq!(cfg.limits, SectionLimits::default());
        assert!(cfg.boundary_headings.iter().any(|h| h == "AI Prompt Output"));
        assert_eq!(
            cfg.template_path(CampaignType::Promo),
            Path::new("templates").join("promo_template.txt")
        );
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
provider = "ollama"
model = "llava"

[limits]
subheadlines = 2

[retry]
max_attempts = 5
"#,
        )
        .unwrap();
        assert!(matches!(cfg.provider, ProviderKind::Ollama));
        assert_eq!(cfg.model, "llava");
        assert_eq!(cfg.limits.get(SectionKind::Subheadlines), Some(2));
        assert_eq!(cfg.limits.get(SectionKind::Headlines), None);
        assert_eq!(cfg.retry.max_attempts, 5);
        assert_eq!(cfg.retry.delay_ms, 0);
        assert_eq!(cfg.template_dir, "templates");
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "output_dir = \"out\"\nexport_txt = true").unwrap();
        let cfg = Config::load(Some(f.path())).unwrap();
        assert_eq!(cfg.output_dir, "out");
        assert!(cfg.export_txt);
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        assert!(matches!(Config::from_toml("retry = 3"), Err(BriefError::Config(_))));
    }
}
