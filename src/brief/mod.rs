pub mod images;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::campaign::BuildRequest;
use crate::prompt::{Prompt, TemplateAssembler};
use crate::provider::{GenerationRequest, Provider};

#[derive(Debug, Clone)]
pub struct Brief {
    pub prompt: Prompt,
    pub text: String,
    /// Reference image sent with the prompt, if any.
    pub image: Option<PathBuf>,
}

/// One brief run against an injected provider.
pub struct BriefGenerator<'a> {
    provider: &'a dyn Provider,
    assembler: TemplateAssembler,
    max_tokens: u32,
}

impl<'a> BriefGenerator<'a> {
    pub fn new(provider: &'a dyn Provider, assembler: TemplateAssembler, max_tokens: u32) -> Self {
        Self { provider, assembler, max_tokens }
    }

    /// Validate the request and assemble its prompt; no model call.
    pub fn prepare(&self, request: &BuildRequest, template: &Path) -> Result<Prompt> {
        request.validate()?;
        Ok(self.assembler.build_prompt(template, request)?)
    }

    /// The first usable image is attached; with none the model runs text-only.
    pub async fn generate(&self, prompt: Prompt, images: &[PathBuf]) -> Result<Brief> {
        let image = images.iter().find(|p| p.is_file()).cloned();
        if image.is_none() && !images.is_empty() {
            tracing::warn!("no reference image readable, generating text-only");
        }

        let req = GenerationRequest {
            prompt: prompt.as_str().to_string(),
            image: image.clone(),
            max_tokens: self.max_tokens,
        };
        tracing::info!(
            provider = self.provider.name(),
            prompt_bytes = req.prompt.len(),
            image = ?image,
            "generating brief"
        );
        let text = self.provider.generate(&req).await?;
        Ok(Brief { prompt, text, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BriefError;
    use async_trait::async_trait;
    use fs_err as fs;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl Provider for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn generate(&self, req: &GenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push(req.clone());
            Ok("# Brief".to_string())
        }
    }

    fn request() -> BuildRequest {
        BuildRequest {
            brand_name: "Azuna".into(),
            product_name: "Purifier".into(),
            angle_description: "Fresh air".into(),
            headlines: vec!["Breathe".into()],
            ..Default::default()
        }
    }

    fn template(dir: &Path) -> PathBuf {
        let p = dir.join("t.txt");
        fs::write(&p, "Brief for {brand_name}\n\nHeadlines Options:\nx\n").unwrap();
        p
    }

    #[tokio::test]
    async fn sends_prompt_and_first_existing_image() {
        let dir = tempfile::tempdir().unwrap();
        let t = template(dir.path());
        let img = dir.path().join("ref.png");
        fs::write(&img, b"x").unwrap();

        let provider = Recorder::default();
        let gen = BriefGenerator::new(&provider, TemplateAssembler::default(), 128);
        let prompt = gen.prepare(&request(), &t).unwrap();
        let brief = gen
            .generate(prompt, &[dir.path().join("gone.png"), img.clone()])
            .await
            .unwrap();

        assert_eq!(brief.text, "# Brief");
        assert_eq!(brief.image, Some(img.clone()));
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "Brief for Azuna\n\nHeadlines Options:\n[Headline 1] Breathe");
        assert_eq!(seen[0].image, Some(img));
        assert_eq!(seen[0].max_tokens, 128);
    }

    #[tokio::test]
    async fn falls_back_to_text_only() {
        let dir = tempfile::tempdir().unwrap();
        let t = template(dir.path());
        let provider = Recorder::default();
        let gen = BriefGenerator::new(&provider, TemplateAssembler::default(), 128);
        let prompt = gen.prepare(&request(), &t).unwrap();
        let brief = gen.generate(prompt, &[]).await.unwrap();
        assert!(brief.image.is_none());
    }

    #[test]
    fn rejects_missing_required_field_without_calling_model() {
        let dir = tempfile::tempdir().unwrap();
        let t = template(dir.path());
        let provider = Recorder::default();
        let gen = BriefGenerator::new(&provider, TemplateAssembler::default(), 128);
        let mut req = request();
        req.angle_description.clear();

        let err = gen.prepare(&req, &t).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BriefError>(),
            Some(BriefError::MissingField("angle_description"))
        ));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn prepare_reports_unreadable_template() {
        let provider = Recorder::default();
        let gen = BriefGenerator::new(&provider, TemplateAssembler::default(), 128);
        let err = gen.prepare(&request(), Path::new("/nonexistent/template.txt")).unwrap_err();
        assert!(matches!(err.downcast_ref::<BriefError>(), Some(BriefError::TemplateRead { .. })));
    }
}
