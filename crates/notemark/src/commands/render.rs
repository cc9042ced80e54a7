//! `notemark render` command implementation.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use notemark_cache::{RenderCache, SharedParseCache};
use notemark_config::{CliSettings, Config};
use notemark_preview::PreviewService;
use notemark_renderer::{FastRenderer, KnownTitles};
use rayon::prelude::*;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown files to render (default: read stdin, write stdout).
    files: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover notemark.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File listing known note titles, one per line (overrides config).
    #[arg(short, long, env = "NOTEMARK_TITLES")]
    titles: Option<PathBuf>,

    /// Write each file to DIR/<stem>.html instead of stdout.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Disable the parse cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            titles_file: self.titles.clone(),
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let titles = config.load_known_titles()?;
        tracing::info!(titles = titles.len(), cache = config.cache.enabled, "Loaded configuration");

        let service = build_service(&config, titles);

        if self.files.is_empty() {
            let text = std::io::read_to_string(std::io::stdin())?;
            return write_stdout(&service.render(&text));
        }

        match &self.output {
            Some(dir) => {
                output.info(&format!("Rendering {} files to {}", self.files.len(), dir.display()));
                let written = render_to_dir(&service, &self.files, dir)?;
                output.success(&format!("Rendered {} files", written.len()));
            }
            None => {
                for file in &self.files {
                    let text = read_note(file)?;
                    write_stdout(&service.render(&text))?;
                }
            }
        }
        Ok(())
    }
}

/// Build the preview service described by the configuration.
fn build_service(config: &Config, titles: KnownTitles) -> PreviewService {
    let renderer = FastRenderer::new()
        .with_options(config.render)
        .with_known_titles(titles);

    if !config.cache.enabled {
        return PreviewService::uncached(renderer);
    }
    let cache: Arc<dyn RenderCache> = Arc::new(SharedParseCache::<String>::with_hash(
        config.cache.capacity,
        config.cache.hash,
    ));
    PreviewService::new(renderer).with_cache(cache, config.cache.hash)
}

/// Render files in parallel to `dir/<stem>.html`.
///
/// Returns the written paths in input order. On failure, returns one of the
/// errors; outputs already written are left in place.
fn render_to_dir(service: &PreviewService, files: &[PathBuf], dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let targets = output_paths(files, dir)?;
    std::fs::create_dir_all(dir).map_err(|e| CliError::file(dir, e))?;

    files
        .par_iter()
        .zip(targets.par_iter())
        .map(|(file, target)| -> Result<PathBuf, CliError> {
            let html = service.render(&read_note(file)?);
            std::fs::write(target, html).map_err(|e| CliError::file(target, e))?;
            tracing::info!(source = %file.display(), target = %target.display(), "Rendered note");
            Ok(target.clone())
        })
        .collect()
}

/// Compute output paths, rejecting files that would overwrite each other.
fn output_paths(files: &[PathBuf], dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let mut seen = HashSet::new();
    files
        .iter()
        .map(|file| {
            let stem = file.file_stem().ok_or_else(|| {
                CliError::Validation(format!("Not a file name: {}", file.display()))
            })?;
            let mut name = stem.to_os_string();
            name.push(".html");
            let target = dir.join(name);
            if !seen.insert(target.clone()) {
                return Err(CliError::Validation(format!(
                    "Multiple inputs map to {}",
                    target.display()
                )));
            }
            Ok(target)
        })
        .collect()
}

fn read_note(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))
}

fn write_stdout(html: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
