use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use log::LevelFilter;

use docx_outline::config::{init_default_config, Overrides, Settings};
use docx_outline::export::{default_output_for, extract_outline_json, ContentFormat};
use docx_outline::outline::ParseMode;

#[derive(Parser, Debug)]
#[command(name = "docx-outline")]
#[command(about = "Rebuild the numbered section outline of a .docx and export it as JSON", long_about = None)]
struct Args {
    /// Write a default docx-outline.toml, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory for --init-config (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config with --init-config
    #[arg(long)]
    force: bool,

    /// Input .docx
    #[arg(value_name = "DOCX")]
    input: Option<PathBuf>,

    /// Output JSON (default: <input_stem>.outline.json)
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,

    /// Section detection: "heading" (heading styles) or "numbering" (list numbering)
    #[arg(long)]
    mode: Option<ParseMode>,

    /// Deepest heading style level treated as a section (1-9)
    #[arg(long, value_name = "N")]
    max_heading_level: Option<u32>,

    /// Rendered content to include: html, json or both
    #[arg(long, value_name = "FORMAT")]
    format: Option<ContentFormat>,

    /// Include the nested section tree
    #[arg(long)]
    tree: bool,

    /// Config file path (default: search for docx-outline.toml upwards, or DOCX_OUTLINE_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info);
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("docx_outline", level)
        .parse_env("RUST_LOG")
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let input = match args.input {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  docx-outline <input.docx> [-o out.json]\n\nTIPS:\n  - Default config search: docx-outline.toml (upwards), or set DOCX_OUTLINE_CONFIG.\n  - RUST_LOG=docx_outline=debug shows dropped content and section decisions.\n"
            );
            return Ok(());
        }
    };
    let output = args.output.unwrap_or_else(|| default_output_for(&input));

    let overrides = Overrides {
        mode: args.mode,
        max_heading_level: args.max_heading_level,
        content_format: args.format,
        include_tree: args.tree,
    };
    let settings = Settings::resolve(&input, args.config, &overrides).context("load config")?;
    init_logging(&settings.log_level);
    if let Some(p) = settings.config_path.as_ref() {
        log::debug!("config: {}", p.display());
    }

    let export = extract_outline_json(&input, &output, &settings.parser, &settings.export)?;
    eprintln!(
        "{}: {} sections -> {}",
        input.display(),
        export.section_count,
        output.display()
    );
    Ok(())
}
