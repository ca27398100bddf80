//! Font registry: resolves font type names used in field policies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::{PdfFont, StandardFont, TrueTypeFont};
use crate::error::{Error, Result};

/// Outcome of scanning a font folder.
#[derive(Debug, Default)]
pub struct FontRegistrationReport {
    /// Names registered, in scan order
    pub registered: Vec<String>,
    /// Files that could not be registered
    pub failures: Vec<Error>,
}

/// Case-insensitive name → font map with a default.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    fonts: IndexMap<String, Arc<PdfFont>>,
    default_font: String,
}

impl FontRegistry {
    /// Registry holding the standard 14 fonts, resolving unspecified names to `default_font`.
    pub fn new(default_font: &str) -> Self {
        let mut fonts = IndexMap::new();
        for name in StandardFont::NAMES {
            if let Some(font) = StandardFont::by_name(name) {
                fonts.insert(name.to_lowercase(), Arc::new(PdfFont::standard(font)));
            }
        }
        Self {
            fonts,
            default_font: default_font.trim().to_lowercase(),
        }
    }

    /// Name used when a policy does not pick a font.
    pub fn default_font_name(&self) -> &str {
        &self.default_font
    }

    /// Register one font file under its file stem, PostScript name and full name.
    ///
    /// Returns the file-stem key.
    pub fn register_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let font = TrueTypeFont::from_file(path).map_err(|e| Error::FontRegistration {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| font.postscript_name().to_lowercase());
        let mut aliases = vec![stem.clone(), font.postscript_name().to_lowercase()];
        if let Some(full) = font.full_name() {
            aliases.push(full.to_lowercase());
        }

        let font = Arc::new(PdfFont::truetype(font));
        for alias in aliases {
            self.fonts.insert(alias, Arc::clone(&font));
        }
        log::debug!("Registered font {} as '{}'", path.display(), stem);
        Ok(stem)
    }

    /// Register every font file in `folder`.
    ///
    /// A missing folder registers nothing. Files that fail are logged and
    /// reported; the scan continues with the next file.
    pub fn register_folder(&mut self, folder: impl AsRef<Path>) -> FontRegistrationReport {
        let folder = folder.as_ref();
        let mut report = FontRegistrationReport::default();

        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Font folder {} not scanned: {}", folder.display(), e);
                return report;
            },
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            match self.register_file(&path) {
                Ok(name) => report.registered.push(name),
                Err(e) => {
                    log::warn!("{}", e);
                    report.failures.push(e);
                },
            }
        }

        log::info!(
            "Registered {} font(s) from {} ({} failed)",
            report.registered.len(),
            folder.display(),
            report.failures.len()
        );
        report
    }

    /// Add an already-loaded font under `name`.
    pub fn insert(&mut self, name: &str, font: PdfFont) {
        self.fonts.insert(name.trim().to_lowercase(), Arc::new(font));
    }

    /// Find a font by type name, ignoring case. `None` or a blank name selects the default.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<PdfFont>> {
        let key = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_lowercase(),
            None => self.default_font.clone(),
        };
        self.fonts
            .get(&key)
            .cloned()
            .ok_or(Error::UnknownFont(key))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(&name.trim().to_lowercase())
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new("helvetica")
    }
}
