//! Recipe table loading
//!
//! Reads `*.recipes` files from a directory tree into a [`RecipeCatalog`].
//! One definition per line:
//!
//! ```text
//! # raw materials
//! base hydrogen
//! alternative weldingfuel
//! composite ammonia 3: hydrogen=3, nitrogen=1
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::catalog::RecipeCatalog;
use crate::models::Quantity;

const RECIPE_EXTENSION: &str = "recipes";

static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][\w-]*)\s*=\s*(\d+)\s*$").expect("quantity pattern is a valid regex")
});

/// Parse a `name=amount` pair such as `hydrogen=17`.
pub fn parse_quantity(text: &str) -> Result<Quantity> {
    let cap = QUANTITY
        .captures(text)
        .ok_or_else(|| anyhow!("expected name=amount, got '{}'", text))?;

    let amount: u64 = cap[2]
        .parse()
        .with_context(|| format!("amount out of range in '{}'", text))?;
    if amount == 0 {
        bail!("amount of {} must be positive", &cap[1]);
    }
    Ok(Quantity::new(&cap[1], amount))
}

/// Find every recipe file under `dir`, sorted by file name.
pub fn find_recipe_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let files = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry under {}", dir.display());
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == RECIPE_EXTENSION))
        .collect();

    Ok(files)
}

/// Compiled line patterns, built once per load
struct LineParser {
    base: Regex,
    alternative: Regex,
    composite: Regex,
}

impl LineParser {
    fn new() -> Result<Self> {
        Ok(Self {
            base: Regex::new(r"^base\s+([A-Za-z][\w-]*)$")?,
            alternative: Regex::new(r"^alternative\s+([A-Za-z][\w-]*)$")?,
            composite: Regex::new(r"^composite\s+([A-Za-z][\w-]*)\s+(\d+)\s*:\s*(.+)$")?,
        })
    }

    fn apply(&self, line: &str, catalog: &mut RecipeCatalog, stats: &mut LoadStats) -> Result<()> {
        if let Some(cap) = self.base.captures(line) {
            catalog.add_base(&cap[1])?;
            stats.bases += 1;
        } else if let Some(cap) = self.alternative.captures(line) {
            catalog.add_alternative(&cap[1])?;
            stats.alternatives += 1;
        } else if let Some(cap) = self.composite.captures(line) {
            let output: u64 = cap[2]
                .parse()
                .with_context(|| format!("output amount out of range for {}", &cap[1]))?;
            let components = cap[3]
                .split(',')
                .map(|part| parse_quantity(part).map(|q| (q.name, q.amount)))
                .collect::<Result<Vec<_>>>()?;
            catalog.add_composite(&cap[1], output, components)?;
            stats.composites += 1;
        } else {
            bail!("unrecognised recipe line '{}'", line);
        }
        Ok(())
    }
}

/// Add every definition in `content` to `catalog`, in line order.
///
/// `source` only labels error messages.
pub fn load_recipes_str(
    content: &str,
    source: &str,
    catalog: &mut RecipeCatalog,
    stats: &mut LoadStats,
) -> Result<()> {
    let parser = LineParser::new()?;
    for (number, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        parser
            .apply(line, catalog, stats)
            .with_context(|| format!("{}:{}", source, number + 1))?;
    }
    Ok(())
}

/// Build a catalog from every recipe file under `dir`.
pub fn load_catalog(dir: &Path) -> Result<(RecipeCatalog, LoadStats)> {
    let mut catalog = RecipeCatalog::new();
    let mut stats = LoadStats::default();

    for path in find_recipe_files(dir)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        load_recipes_str(&content, &path.display().to_string(), &mut catalog, &mut stats)?;
        stats.files += 1;
        debug!(file = %path.display(), "loaded recipe file");
    }

    if stats.files == 0 {
        bail!("no .{} files found under {}", RECIPE_EXTENSION, dir.display());
    }
    Ok((catalog, stats))
}

#[derive(Debug, Default)]
pub struct LoadStats {
    pub files: usize,
    pub bases: usize,
    pub alternatives: usize,
    pub composites: usize,
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} recipes from {} files ({} base, {} alternative, {} composite)",
            self.bases + self.alternatives + self.composites,
            self.files,
            self.bases,
            self.alternatives,
            self.composites
        )
    }
}
