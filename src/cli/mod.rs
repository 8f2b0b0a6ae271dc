use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::campaign::BuildRequest;
use crate::config::Config;
use crate::prompt::sections::SectionKind;

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CampaignType {
    #[default]
    Evergreen,
    Promo,
}

/// Sections the model can draft ideas for.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestTarget {
    Headlines,
    Subheadlines,
}

impl SuggestTarget {
    pub fn section(self) -> SectionKind {
        match self {
            SuggestTarget::Headlines => SectionKind::Headlines,
            SuggestTarget::Subheadlines => SectionKind::Subheadlines,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "creative_brief", version, about = "Assemble creative-brief prompts and generate briefs with a vision/language model")]
pub struct Args {
    /// TOML config file (defaults to ./creative_brief.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TOML campaign file holding the brief inputs
    #[arg(long)]
    pub campaign: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CampaignType::Evergreen)]
    pub campaign_type: CampaignType,

    /// Template file, overriding the campaign type's template
    #[arg(long)]
    pub template: Option<PathBuf>,

    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub audience: Option<String>,
    #[arg(long)]
    pub tone: Option<String>,
    #[arg(long)]
    pub voiceover_tone: Option<String>,
    #[arg(long)]
    pub angle: Option<String>,
    #[arg(long)]
    pub angle_benefits: Option<String>,
    #[arg(long)]
    pub image_description: Option<String>,
    #[arg(long)]
    pub num_image_briefs: Option<u32>,
    #[arg(long)]
    pub num_video_briefs: Option<u32>,

    #[arg(long = "headline")]
    pub headlines: Vec<String>,
    #[arg(long = "subheadline")]
    pub subheadlines: Vec<String>,
    #[arg(long = "review")]
    pub reviews: Vec<String>,
    #[arg(long = "benefit")]
    pub benefits: Vec<String>,
    #[arg(long = "social-proof")]
    pub social_proof: Vec<String>,
    #[arg(long = "content")]
    pub content_bank: Vec<String>,

    /// Swipe-file CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Reference image; may be repeated
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Skip downloading reference images listed in the CSV
    #[arg(long, default_value_t = false)]
    pub no_download: bool,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub output_dir: Option<String>,

    /// Also write a plain-text copy of the brief
    #[arg(long, default_value_t = false)]
    pub txt: bool,

    /// Draft headline or subheadline ideas from brand and angle, then exit
    #[arg(long, value_enum, conflicts_with = "dry_run")]
    pub suggest: Option<SuggestTarget>,

    /// Print the assembled prompt without calling the model
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    pub fn apply_config(&self, cfg: &mut Config) {
        if let Some(p) = self.provider {
            cfg.provider = p;
        }
        if let Some(m) = &self.model {
            cfg.model = m.clone();
        }
        if let Some(t) = self.timeout_secs {
            cfg.timeout_secs = t;
        }
        if let Some(t) = self.max_tokens {
            cfg.max_tokens = t;
        }
        if let Some(o) = &self.output_dir {
            cfg.output_dir = o.clone();
        }
        if self.txt {
            cfg.export_txt = true;
        }
    }

    /// Flags win over the campaign file; list flags replace whole lists.
    pub fn apply_request(&self, req: &mut BuildRequest) {
        fn set(target: &mut String, v: &Option<String>) {
            if let Some(v) = v {
                *target = v.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, v: &Option<String>) {
            if v.is_some() {
                *target = v.clone();
            }
        }
        fn set_list(target: &mut Vec<String>, v: &[String]) {
            if !v.is_empty() {
                *target = v.to_vec();
            }
        }

        set(&mut req.brand_name, &self.brand);
        set(&mut req.product_name, &self.product);
        set(&mut req.angle_description, &self.angle);
        set_opt(&mut req.website_url, &self.website);
        set_opt(&mut req.target_audience, &self.audience);
        set_opt(&mut req.tone, &self.tone);
        set_opt(&mut req.voiceover_tone, &self.voiceover_tone);
        set_opt(&mut req.angle_and_benefits, &self.angle_benefits);
        set_opt(&mut req.reference_image_description, &self.image_description);
        if let Some(n) = self.num_image_briefs {
            req.num_image_briefs = n;
        }
        if let Some(n) = self.num_video_briefs {
            req.num_video_briefs = n;
        }
        set_list(&mut req.headlines, &self.headlines);
        set_list(&mut req.subheadlines, &self.subheadlines);
        set_list(&mut req.customer_reviews, &self.reviews);
        set_list(&mut req.benefits, &self.benefits);
        set_list(&mut req.social_proof, &self.social_proof);
        set_list(&mut req.content_bank, &self.content_bank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_list_flags() {
        let args = Args::try_parse_from([
            "creative_brief",
            "--brand", "Azuna",
            "--headline", "Fresh Air Now",
            "--headline", "Breathe Better",
            "--campaign-type", "promo",
            "--provider", "open-ai",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.headlines, vec!["Fresh Air Now", "Breathe Better"]);
        assert_eq!(args.campaign_type, CampaignType::Promo);
        assert!(matches!(args.provider, Some(ProviderKind::OpenAI)));
        assert!(args.dry_run);
    }

    #[test]
    fn flags_override_campaign_values() {
        let args = Args::try_parse_from(["creative_brief", "--tone", "bold", "--benefit", "Quiet"]).unwrap();
        let mut req = BuildRequest {
            brand_name: "Azuna".into(),
            tone: Some("calm".into()),
            benefits: vec!["Old".into(), "Older".into()],
            headlines: vec!["Keep".into()],
            ..Default::default()
        };
        args.apply_request(&mut req);
        assert_eq!(req.brand_name, "Azuna");
        assert_eq!(req.tone.as_deref(), Some("bold"));
        assert_eq!(req.benefits, vec!["Quiet"]);
        assert_eq!(req.headlines, vec!["Keep"]);
    }

    #[test]
    fn parses_suggest_target() {
        let args = Args::try_parse_from(["creative_brief", "--suggest", "subheadlines"]).unwrap();
        assert_eq!(args.suggest, Some(SuggestTarget::Subheadlines));
        assert_eq!(SuggestTarget::Subheadlines.section(), SectionKind::Subheadlines);
        assert!(Args::try_parse_from(["creative_brief", "--suggest", "headlines", "--dry-run"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from(["creative_brief", "--model", "llava", "--txt"]).unwrap();
        let mut cfg = Config::default();
        args.apply_config(&mut cfg);
        assert_eq!(cfg.model, "llava");
        assert!(cfg.export_txt);
        assert_eq!(cfg.timeout_secs, Config::default().timeout_secs);
    }
}
