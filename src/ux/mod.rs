use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::campaign::BuildRequest;
use crate::cli::SuggestTarget;
use crate::output::SavedPaths;
use crate::prompt::sections::{render_section_values, SECTIONS};
use crate::prompt::Prompt;

pub fn show_request(req: &BuildRequest, template: &std::path::Path) {
    println!("\n=== CAMPAIGN ===");
    println!("{} / {}", req.brand_name.bold(), req.product_name);
    println!("template: {}", template.display());
    for spec in SECTIONS.iter() {
        let n = req
            .section_values(spec.kind)
            .iter()
            .filter(|v| !v.trim().is_empty())
            .count();
        let label = format!("{:?}", spec.kind);
        if n == 0 {
            println!("  {:<16} {}", label, "omitted".dimmed());
        } else {
            println!("  {:<16} {}", label, n.to_string().green().bold());
        }
    }
    if req.csv_data.is_some() {
        println!("  {:<16} {}", "SwipeCsv", "attached".cyan().bold());
    }
    println!();
}

pub fn print_prompt(prompt: &Prompt) {
    println!("{}", "===== PROMPT =====".bold());
    println!("{}", prompt);
}

pub fn print_suggestions(target: SuggestTarget, ideas: &[String]) {
    println!("\n=== {} ===", target.section().spec().canonical_heading.bold());
    if ideas.is_empty() {
        println!("{}", "(no suggestions)".dimmed());
    }
    for line in render_section_values(target.section(), ideas) {
        println!("{line}");
    }
    println!();
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn print_saved(saved: &SavedPaths) {
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Brief saved ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!("  {}: {}", "Run".bold(), saved.dir.display());
    if let Some(p) = &saved.brief {
        println!("  {}: {}", "Brief".green().bold(), p.display());
    }
    if let Some(p) = &saved.text {
        println!("  {}: {}", "Text".yellow().bold(), p.display());
    }
    if let Some(p) = &saved.prompt {
        println!("  {}: {}", "Prompt".cyan().bold(), p.display());
    }
    match &saved.reference_image {
        Some(p) => println!("  {}: {}", "Image".magenta().bold(), p.display()),
        None => println!("  {}: {}", "Image".magenta().bold(), "none (text-only)".dimmed()),
    }
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
}
