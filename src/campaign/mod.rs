use anyhow::Context;
use fs_err as fs;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::errors::BriefError;
use crate::prompt::sections::SectionKind;

fn default_brief_count() -> u32 {
    10
}

/// Everything one prompt assembly needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildRequest {
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub voiceover_tone: Option<String>,
    #[serde(default)]
    pub angle_description: String,
    #[serde(default)]
    pub angle_and_benefits: Option<String>,
    #[serde(default)]
    pub reference_image_description: Option<String>,
    #[serde(default = "default_brief_count")]
    pub num_image_briefs: u32,
    #[serde(default = "default_brief_count")]
    pub num_video_briefs: u32,

    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub subheadlines: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub customer_reviews: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub social_proof: Vec<String>,
    #[serde(default)]
    pub content_bank: Vec<String>,

    /// Raw swipe CSV text.
    #[serde(default)]
    pub csv_data: Option<String>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            brand_name: String::new(),
            product_name: String::new(),
            website_url: None,
            target_audience: None,
            tone: None,
            voiceover_tone: None,
            angle_description: String::new(),
            angle_and_benefits: None,
            reference_image_description: None,
            num_image_briefs: default_brief_count(),
            num_video_briefs: default_brief_count(),
            headlines: Vec::new(),
            subheadlines: Vec::new(),
            customer_reviews: Vec::new(),
            benefits: Vec::new(),
            social_proof: Vec::new(),
            content_bank: Vec::new(),
            csv_data: None,
        }
    }
}

impl BuildRequest {
    pub fn from_toml(s: &str) -> Result<Self, BriefError> {
        toml::from_str(s).map_err(|e| BriefError::Config(format!("campaign file: {e}")))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_toml(&s).with_context(|| format!("parsing {}", path.display()))
    }

    /// Fields the caller must supply before a prompt is assembled.
    pub fn validate(&self) -> Result<(), BriefError> {
        let required = [
            ("brand_name", &self.brand_name),
            ("product_name", &self.product_name),
            ("angle_description", &self.angle_description),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(BriefError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Placeholder name and substitution value for every scalar field.
    pub fn scalars(&self) -> Vec<(&'static str, String)> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("brand_name", self.brand_name.clone()),
            ("product_name", self.product_name.clone()),
            ("website_url", opt(&self.website_url)),
            ("target_audience", opt(&self.target_audience)),
            ("tone", opt(&self.tone)),
            ("voiceover_tone", opt(&self.voiceover_tone)),
            ("angle_description", self.angle_description.clone()),
            ("angle_and_benefits", opt(&self.angle_and_benefits)),
            ("reference_image_description", opt(&self.reference_image_description)),
            ("num_image_briefs", self.num_image_briefs.to_string()),
            ("num_video_briefs", self.num_video_briefs.to_string()),
        ]
    }

    pub fn section_values(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Headlines => &self.headlines,
            SectionKind::Subheadlines => &self.subheadlines,
            SectionKind::CustomerReviews => &self.customer_reviews,
            SectionKind::Benefits => &self.benefits,
            SectionKind::SocialProof => &self.social_proof,
            SectionKind::ContentBank => &self.content_bank,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> BuildRequest {
        BuildRequest {
            brand_name: "Azuna".into(),
            product_name: "Natural Air Purifier".into(),
            angle_description: "No harsh chemicals".into(),
            ..Default::default()
        }
    }

    #[test]
    fn validate_accepts_required_fields() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_required_field() {
        let mut req = valid();
        req.product_name = "   ".into();
        match req.validate() {
            Err(BriefError::MissingField(name)) => assert_eq!(name, "product_name"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn parses_campaign_toml() {
        let req = BuildRequest::from_toml(
            r#"
brand_name = "Azuna"
product_name = "Purifier"
angle_description = "Fresh air"
tone = "calm"
num_image_briefs = 4
headlines = ["Fresh Air Now", "Breathe Better"]
customer_reviews = "Love it. Five stars."
social_proof = ["10,000+ customers"]
"#,
        )
        .unwrap();
        assert_eq!(req.tone.as_deref(), Some("calm"));
        assert_eq!(req.num_image_briefs, 4);
        assert_eq!(req.num_video_briefs, 10);
        assert_eq!(req.headlines.len(), 2);
        assert_eq!(req.customer_reviews, vec!["Love it. Five stars."]);
        assert_eq!(req.section_values(SectionKind::SocialProof), ["10,000+ customers"]);
        assert!(req.benefits.is_empty());
    }

    #[test]
    fn bad_campaign_toml_is_config_error() {
        assert!(matches!(
            BuildRequest::from_toml("brand_name = ["),
            Err(BriefError::Config(_))
        ));
    }

    #[test]
    fn missing_optional_scalars_substitute_empty() {
        let scalars = valid().scalars();
        let tone = scalars.iter().find(|(k, _)| *k == "tone").unwrap();
        assert_eq!(tone.1, "");
        let n = scalars.iter().find(|(k, _)| *k == "num_video_briefs").unwrap();
        assert_eq!(n.1, "10");
    }
}
