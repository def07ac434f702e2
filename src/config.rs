use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::classify::MAX_HEADING_LEVEL;
use crate::export::{ContentFormat, ExportOptions};
use crate::outline::{ParseMode, ParserOptions};

pub const DEFAULT_CONFIG_FILE: &str = "docx-outline.toml";
pub const CONFIG_ENV: &str = "DOCX_OUTLINE_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub parser: ParserSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ParserSection {
    /// Deepest `heading k` style treated as a heading (1-9).
    #[serde(default)]
    pub max_heading_level: Option<u32>,
    /// "heading" (paragraph styles) or "numbering" (Word list numbering).
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct OutputSection {
    /// "html", "json" or "both".
    #[serde(default)]
    pub content_format: Option<String>,
    #[serde(default)]
    pub pretty: Option<bool>,
    #[serde(default)]
    pub include_tree: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
}

/// Command-line values that take precedence over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub mode: Option<ParseMode>,
    pub max_heading_level: Option<u32>,
    pub content_format: Option<ContentFormat>,
    pub include_tree: bool,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub config_path: Option<PathBuf>,
    pub parser: ParserOptions,
    pub export: ExportOptions,
    pub log_level: String,
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

pub fn find_default_config(workdir: &Path, filename: &str) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    find_file_upwards(workdir, filename, 8)
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

impl Settings {
    /// Explicit path, then `DOCX_OUTLINE_CONFIG`, then an upward search from
    /// the working directory and the input's directory.
    pub fn resolve(
        input: &Path,
        config_path: Option<PathBuf>,
        overrides: &Overrides,
    ) -> anyhow::Result<Self> {
        let workdir = input
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let cfg_file = config_path
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
            .or_else(|| find_default_config(&workdir, DEFAULT_CONFIG_FILE));

        let mut file_cfg = AppConfig::default();
        if let Some(p) = cfg_file.as_ref() {
            if p.exists() {
                file_cfg = load_config(p)?;
            } else {
                bail!("config not found: {}", p.display());
            }
        }
        let mut settings = Self::from_config(&file_cfg, overrides)?;
        settings.config_path = cfg_file;
        Ok(settings)
    }

    pub fn from_config(cfg: &AppConfig, overrides: &Overrides) -> anyhow::Result<Self> {
        let mode = match (overrides.mode, cfg.parser.mode.as_deref()) {
            (Some(m), _) => m,
            (None, Some(s)) => s
                .parse::<ParseMode>()
                .map_err(anyhow::Error::msg)
                .context("[parser] mode")?,
            (None, None) => ParseMode::default(),
        };
        let max_heading_level = overrides
            .max_heading_level
            .or(cfg.parser.max_heading_level)
            .unwrap_or(MAX_HEADING_LEVEL);
        if !(1..=MAX_HEADING_LEVEL).contains(&max_heading_level) {
            bail!("max_heading_level must be between 1 and {MAX_HEADING_LEVEL}, got {max_heading_level}");
        }
        let content_format = match (overrides.content_format, cfg.output.content_format.as_deref()) {
            (Some(f), _) => f,
            (None, Some(s)) => s
                .parse::<ContentFormat>()
                .map_err(anyhow::Error::msg)
                .context("[output] content_format")?,
            (None, None) => ContentFormat::default(),
        };

        Ok(Self {
            config_path: None,
            parser: ParserOptions {
                max_heading_level,
                mode,
            },
            export: ExportOptions {
                content_format,
                include_tree: overrides.include_tree || cfg.output.include_tree.unwrap_or(false),
                pretty: cfg.output.pretty.unwrap_or(true),
            },
            log_level: cfg
                .logging
                .level
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("info")
                .to_string(),
        })
    }
}

const DEFAULT_CONFIG_TOML: &str = r#"[parser]
# "heading": sections start at paragraphs styled "Heading 1".."Heading N".
# "numbering": sections start at paragraphs with their own list numbering.
mode = "heading"
max_heading_level = 9

[output]
# "html", "json" or "both"
content_format = "both"
pretty = true
# Also write the nested section tree.
include_tree = false

[logging]
# error | warn | info | debug | trace (RUST_LOG overrides this)
level = "info"
"#;

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(DEFAULT_CONFIG_FILE);
    if cfg_path.exists() && !force {
        bail!(
            "config already exists: {} (use --force to overwrite)",
            cfg_path.display()
        );
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docx-outline-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("mkdir");
        dir
    }

    #[test]
    fn default_file_parses_to_defaults() {
        let cfg: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("toml");
        let s = Settings::from_config(&cfg, &Overrides::default()).expect("settings");
        assert_eq!(s.parser, ParserOptions::default());
        assert_eq!(s.export.content_format, ContentFormat::Both);
        assert!(s.export.pretty);
        assert!(!s.export.include_tree);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn overrides_beat_file_values() {
        let cfg: AppConfig = toml::from_str(
            "[parser]\nmode = \"numbering\"\nmax_heading_level = 4\n[output]\ncontent_format = \"html\"\n",
        )
        .expect("toml");
        let s = Settings::from_config(&cfg, &Overrides::default()).expect("settings");
        assert_eq!(s.parser.mode, ParseMode::NativeNumbering);
        assert_eq!(s.parser.max_heading_level, 4);
        assert_eq!(s.export.content_format, ContentFormat::Html);

        let o = Overrides {
            mode: Some(ParseMode::HeadingStyle),
            max_heading_level: Some(2),
            content_format: Some(ContentFormat::Json),
            include_tree: true,
        };
        let s = Settings::from_config(&cfg, &o).expect("settings");
        assert_eq!(s.parser.mode, ParseMode::HeadingStyle);
        assert_eq!(s.parser.max_heading_level, 2);
        assert_eq!(s.export.content_format, ContentFormat::Json);
        assert!(s.export.include_tree);
    }

    #[test]
    fn rejects_bad_values() {
        let cfg: AppConfig = toml::from_str("[parser]\nmode = \"chapters\"\n").expect("toml");
        assert!(Settings::from_config(&cfg, &Overrides::default()).is_err());
        let cfg: AppConfig = toml::from_str("[parser]\nmax_heading_level = 12\n").expect("toml");
        assert!(Settings::from_config(&cfg, &Overrides::default()).is_err());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = scratch("init");
        let path = init_default_config(&dir, false).expect("first write");
        assert!(path.ends_with(DEFAULT_CONFIG_FILE));
        assert!(init_default_config(&dir, false).is_err());
        assert!(init_default_config(&dir, true).is_ok());
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.logging.level.as_deref(), Some("info"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn finds_config_in_ancestor_directories() {
        let dir = scratch("search");
        let nested = dir.join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(dir.join(DEFAULT_CONFIG_FILE), "").expect("write");
        assert_eq!(
            find_file_upwards(&nested, DEFAULT_CONFIG_FILE, 8),
            Some(dir.join(DEFAULT_CONFIG_FILE))
        );
        assert_eq!(find_file_upwards(&nested, DEFAULT_CONFIG_FILE, 1), None);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
