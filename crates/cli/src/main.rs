//! CLI tool for generating PowerPoint decks from a topic.

use anyhow::{Context, Result};
use clap::Parser;
use deckgen_core::{DetailLevel, ImageSearch, Offline, Palette, Rgb, TextGenerator};
use deckgen_pptx::{list_themes, theme_path, DeckGenerator, DeckReader, GenerateOptions};
use deckgen_providers::{GroqClient, ProviderConfig, UnsplashClient};
use std::path::{Path, PathBuf};

/// Generate a presentation about a topic, with model-written text and
/// stock photos.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Presentation topic
    #[arg(short, long, default_value = "Artificial Intelligence")]
    topic: String,

    /// Level of detail: simple or detailed
    #[arg(short, long, default_value = "simple")]
    detail: DetailLevel,

    /// Theme name (a .pptx file in the themes directory)
    #[arg(long)]
    theme: Option<String>,

    /// Directory holding theme files
    #[arg(long, default_value = "themes")]
    themes_dir: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "presentation.pptx")]
    output: PathBuf,

    /// Seed for reproducible layouts and image picks
    #[arg(long)]
    seed: Option<u64>,

    /// Do not search for images
    #[arg(long)]
    no_images: bool,

    /// Use the built-in outline and no images, even if keys are set
    #[arg(long)]
    offline: bool,

    /// Primary colour (#rrggbb)
    #[arg(long)]
    primary_color: Option<Rgb>,

    /// Accent colour (#rrggbb)
    #[arg(long)]
    accent_color: Option<Rgb>,

    /// Print the parsed outline as JSON instead of writing a deck
    #[arg(long)]
    print_outline: bool,

    /// List available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Print the slide text of an existing deck and exit
    #[arg(long, value_name = "FILE")]
    inspect: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.list_themes {
        return print_themes(&args.themes_dir);
    }

    if let Some(path) = &args.inspect {
        return inspect(path);
    }

    let config = if args.offline {
        ProviderConfig::default()
    } else {
        ProviderConfig::from_env()
    };
    let text = text_generator(&config, args.offline)?;
    let images = image_search(&config, args.offline)?;
    let generator = DeckGenerator::new(text.as_ref(), images.as_ref());

    if args.print_outline {
        let (parsed, _) = generator.outline(&args.topic, args.detail);
        let json = serde_json::to_string_pretty(&parsed).context("Failed to serialize outline")?;
        println!("{}", json);
        return Ok(());
    }

    let mut options = GenerateOptions::new(args.topic.as_str(), args.output.as_path());
    options.detail = args.detail;
    options.theme = args
        .theme
        .as_deref()
        .map(|name| theme_path(&args.themes_dir, name));
    options.seed = args.seed;
    options.images = !args.no_images;
    options.palette = Palette::new(
        args.primary_color.unwrap_or(Palette::default().primary),
        args.accent_color.unwrap_or(Palette::default().accent),
    );

    let report = generator
        .generate(&options)
        .with_context(|| format!("Failed to generate {}", options.output.display()))?;

    if args.verbose {
        for (i, slide) in report.slides.iter().enumerate() {
            let layout = slide
                .layout
                .map(|l| l.to_string())
                .unwrap_or_else(|| "closing".to_string());
            let image = if slide.has_image { " +image" } else { "" };
            eprintln!("  {:>2}. {} [{}{}]", i + 1, slide.title, layout, image);
        }
    }
    if report.fallback_outline {
        eprintln!("Note: used the built-in outline for '{}'", args.topic);
    }
    println!(
        "Wrote '{}' ({} slides) to {}",
        report.title,
        report.slides.len(),
        report.output.display()
    );

    Ok(())
}

/// Text generator from config, or the offline stand-in.
fn text_generator(config: &ProviderConfig, offline: bool) -> Result<Box<dyn TextGenerator>> {
    match &config.groq {
        Some(groq) => {
            let client = GroqClient::new(groq.clone()).context("Failed to set up Groq client")?;
            Ok(Box::new(client))
        }
        None => {
            if !offline {
                log::warn!("GROQ_API_KEY is not set; using the built-in outline");
            }
            Ok(Box::new(Offline))
        }
    }
}

/// Image search from config, or the offline stand-in.
fn image_search(config: &ProviderConfig, offline: bool) -> Result<Box<dyn ImageSearch>> {
    match &config.unsplash {
        Some(unsplash) => {
            let client =
                UnsplashClient::new(unsplash.clone()).context("Failed to set up Unsplash client")?;
            Ok(Box::new(client))
        }
        None => {
            if !offline {
                log::warn!("UNSPLASH_ACCESS_KEY is not set; slides will have no images");
            }
            Ok(Box::new(Offline))
        }
    }
}

/// Print the theme names found in `dir`.
fn print_themes(dir: &Path) -> Result<()> {
    let themes = list_themes(dir)
        .with_context(|| format!("Failed to read themes from {}", dir.display()))?;
    if themes.is_empty() {
        eprintln!("No themes in {}", dir.display());
    }
    for theme in themes {
        println!("{}", theme);
    }
    Ok(())
}

/// Print the slide text of an existing deck.
fn inspect(path: &Path) -> Result<()> {
    let summary = DeckReader::new()
        .open(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    for slide in &summary.slides {
        let pictures = match slide.pictures {
            0 => String::new(),
            1 => " (1 picture)".to_string(),
            n => format!(" ({} pictures)", n),
        };
        println!("Slide {}{}", slide.number, pictures);
        for paragraph in &slide.paragraphs {
            println!("  {}", paragraph);
        }
    }
    Ok(())
}
