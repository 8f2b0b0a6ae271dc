//! Headline and subheadline ideas drafted by the model from brand and angle.

use anyhow::Result;

use crate::campaign::BuildRequest;
use crate::cli::SuggestTarget;
use crate::config::SectionLimits;
use crate::errors::BriefError;
use crate::provider::{GenerationRequest, Provider};

const SUGGESTION_MAX_TOKENS: u32 = 128;

/// Ideas drafted per target before `[limits]` applies.
pub fn default_count(target: SuggestTarget) -> usize {
    match target {
        SuggestTarget::Headlines => 3,
        SuggestTarget::Subheadlines => 2,
    }
}

pub fn suggestion_count(target: SuggestTarget, limits: &SectionLimits) -> usize {
    let count = default_count(target);
    limits.get(target.section()).map_or(count, |limit| count.min(limit))
}

pub fn suggestion_prompt(target: SuggestTarget, brand: &str, angle: &str) -> String {
    let n = default_count(target);
    match target {
        SuggestTarget::Headlines => format!(
            "Write {n} short and compelling Facebook ad headlines for the product '{brand}' \
             based on this campaign angle: {angle}."
        ),
        SuggestTarget::Subheadlines => format!(
            "Write {n} persuasive subheadlines for Facebook ads for the product '{brand}', \
             using this campaign angle: {angle}. Each subheadline should be 1 sentence explaining the benefit."
        ),
    }
}

/// First non-blank line of a model reply.
fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

pub struct Suggester<'a> {
    provider: &'a dyn Provider,
}

impl<'a> Suggester<'a> {
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self { provider }
    }

    /// One model call per idea; each reply contributes its first line.
    pub async fn suggest(
        &self,
        target: SuggestTarget,
        request: &BuildRequest,
        limits: &SectionLimits,
    ) -> Result<Vec<String>> {
        if request.brand_name.trim().is_empty() {
            return Err(BriefError::MissingField("brand_name").into());
        }
        if request.angle_description.trim().is_empty() {
            return Err(BriefError::MissingField("angle_description").into());
        }

        let count = suggestion_count(target, limits);
        let req = GenerationRequest {
            prompt: suggestion_prompt(target, request.brand_name.trim(), request.angle_description.trim()),
            image: None,
            max_tokens: SUGGESTION_MAX_TOKENS,
        };
        tracing::info!(provider = self.provider.name(), ?target, count, "drafting suggestions");

        let mut ideas = Vec::with_capacity(count);
        for _ in 0..count {
            let reply = self.provider.generate(&req).await?;
            match first_line(&reply) {
                Some(line) => ideas.push(line),
                None => tracing::warn!(?target, "model returned an empty suggestion"),
            }
        }
        Ok(ideas)
    }
}
