use clap::Parser;
use fs_err as fs;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

mod brief;
mod campaign;
mod cli;
mod config;
mod errors;
mod output;
mod prompt;
mod provider;
mod suggest;
mod swipe;
mod ux;

const IMAGE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing(debug: bool) {
    let level = if debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.debug);

    let mut cfg = config::Config::load(args.config.as_deref())?;
    args.apply_config(&mut cfg);

    let mut request = match &args.campaign {
        Some(path) => campaign::BuildRequest::load(path)?,
        None => campaign::BuildRequest::default(),
    };
    args.apply_request(&mut request);

    // ===== SUGGEST: headline/subheadline ideas only =====
    if let Some(target) = args.suggest {
        let provider = provider::make_provider(&cfg)?;
        let pb = ux::spinner(&format!("drafting {:?} with {} ({})", target, provider.name(), cfg.model));
        let result = suggest::Suggester::new(provider.as_ref())
            .suggest(target, &request, &cfg.limits)
            .await;
        pb.finish_and_clear();
        ux::print_suggestions(target, &result?);
        return Ok(());
    }

    if let Some(csv) = &args.csv {
        request.csv_data = Some(fs::read_to_string(csv)?);
    }
    request.validate()?;

    let template = args
        .template
        .clone()
        .unwrap_or_else(|| cfg.template_path(args.campaign_type));
    ux::show_request(&request, &template);

    let assembler = prompt::TemplateAssembler::from_config(&cfg);

    // ===== DRY RUN: prompt only =====
    if args.dry_run {
        let prompt = assembler.build_prompt(&template, &request)?;
        ux::print_prompt(&prompt);
        return Ok(());
    }

    let provider = provider::make_provider(&cfg)?;
    let generator = brief::BriefGenerator::new(provider.as_ref(), assembler, cfg.max_tokens);
    let prompt = generator.prepare(&request, &template)?;

    let mut images = brief::images::collect_images(&args.images, args.images_dir.as_deref());
    let urls = prompt.reference_images();
    if !args.no_download && !urls.is_empty() {
        let client = reqwest::Client::builder().timeout(IMAGE_DOWNLOAD_TIMEOUT).build()?;
        let downloaded =
            brief::images::download_images(&client, urls, Path::new(&cfg.image_cache_dir)).await;
        images.extend(downloaded);
    }

    // ===== GENERATE =====
    let pb = ux::spinner(&format!("generating brief with {} ({})", provider.name(), cfg.model));
    let result = generator.generate(prompt, &images).await;
    pb.finish_and_clear();
    let brief = result?;

    let dir = output::run_dir(Path::new(&cfg.output_dir), Uuid::new_v4());
    let saved = output::save_brief(&dir, &brief, cfg.save_prompt, cfg.export_txt)?;
    ux::print_saved(&saved);

    Ok(())
}
