//! Fill session over one output document.
//!
//! A [`PdfBuilder`] owns the document being filled and the path it is
//! written to. The session moves `Building -> Finalizing -> Reopened` when
//! deferred 3D assets are placed: the document is written, stamped on disk,
//! then reopened from a scratch copy so filling can continue. The scratch
//! file is deleted when the builder is saved or dropped.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::config::FillConfig;
use crate::deferred::{DeferredAsset, DeferredAssetPass, DeferredPassReport};
use crate::error::{Error, Result};
use crate::fonts::FontRegistry;
use crate::form::AcroFormDocument;
use crate::populate::{FieldPopulator, PopulateReport};
use crate::record::{FormRecord, RecordField, RecordSchema};

/// Where a session is in the deferred-asset protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Filling the in-memory document
    Building,
    /// Written and being stamped on disk
    Finalizing,
    /// Reopened from the stamped output
    Reopened,
}

/// Owns one output document for its whole fill session.
///
/// ```no_run
/// use pdf_filler::builder::PdfBuilder;
/// use pdf_filler::config::FillConfig;
/// use pdf_filler::policy::FieldPolicy;
/// use pdf_filler::record::RecordField;
///
/// # fn main() -> pdf_filler::Result<()> {
/// let mut builder = PdfBuilder::open("template.pdf", "out.pdf", FillConfig::default())?;
/// builder.fill_fields(&[RecordField::new("Name", Some("Ada".into()), FieldPolicy::required())])?;
/// builder.place_deferred_assets()?;
/// builder.save()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PdfBuilder {
    target: PathBuf,
    form: AcroFormDocument,
    fonts: FontRegistry,
    config: FillConfig,
    deferred: Vec<DeferredAsset>,
    state: SessionState,
    scratch: Option<TempPath>,
}

impl PdfBuilder {
    /// Open `template` for filling into `target`.
    ///
    /// Fonts in `config.font_folder` are registered; files that fail are
    /// logged and skipped.
    pub fn open(template: impl AsRef<Path>, target: impl Into<PathBuf>, config: FillConfig) -> Result<Self> {
        let form = AcroFormDocument::load(template.as_ref())?;
        log::info!("Opened template {}", template.as_ref().display());
        Ok(Self::from_form(form, target, config))
    }

    /// Start from a blank one-page document with an empty form.
    pub fn create(target: impl Into<PathBuf>, config: FillConfig) -> Result<Self> {
        Ok(Self::from_form(AcroFormDocument::new_blank()?, target, config))
    }

    /// Fill an already loaded form into `target`.
    pub fn from_form(form: AcroFormDocument, target: impl Into<PathBuf>, config: FillConfig) -> Self {
        let mut fonts = FontRegistry::new(&config.default_font);
        let report = fonts.register_folder(&config.font_folder);
        if !report.failures.is_empty() {
            log::warn!("{} font files could not be registered", report.failures.len());
        }

        Self {
            target: target.into(),
            form,
            fonts,
            config,
            deferred: Vec::new(),
            state: SessionState::Building,
            scratch: None,
        }
    }

    /// Font registry, for registering extra fonts.
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    /// Font registry.
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Active configuration.
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// The document being filled.
    pub fn form(&self) -> &AcroFormDocument {
        &self.form
    }

    /// Output path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 3D assets waiting for [`place_deferred_assets`](Self::place_deferred_assets).
    pub fn pending_assets(&self) -> &[DeferredAsset] {
        &self.deferred
    }

    /// Populate the form with `fields`.
    pub fn fill_fields(&mut self, fields: &[RecordField]) -> Result<PopulateReport> {
        self.ensure_writable("fill fields")?;
        let mut populator = FieldPopulator::new(&mut self.form, &self.fonts, &self.config);
        let result = populator.populate(fields);
        // Assets found before a failure are kept; their fields are already gone.
        self.deferred.extend(populator.into_deferred());
        result
    }

    /// Populate the form from a record with its own schema.
    pub fn fill_record<T: FormRecord>(&mut self, record: &T) -> Result<PopulateReport> {
        self.fill_with_schema(&T::schema(), record)
    }

    /// Populate the form from `record` through `schema`.
    pub fn fill_with_schema<T>(&mut self, schema: &RecordSchema<T>, record: &T) -> Result<PopulateReport> {
        self.fill_fields(&schema.bind(record))
    }

    /// Write the document, stamp pending 3D assets into the written file and
    /// reopen the session from it.
    ///
    /// Does nothing when no assets are pending.
    pub fn place_deferred_assets(&mut self) -> Result<DeferredPassReport> {
        self.ensure_writable("place deferred assets")?;
        if self.deferred.is_empty() {
            log::debug!("No deferred assets to place");
            return Ok(DeferredPassReport::default());
        }

        let previous = self.state;
        let assets = std::mem::take(&mut self.deferred);
        self.state = SessionState::Finalizing;

        match self.finalize(assets.clone()) {
            Ok(report) => {
                self.state = SessionState::Reopened;
                Ok(report)
            },
            Err(e) => {
                log::warn!("Deferred pass failed, {} assets stay pending: {}", assets.len(), e);
                self.deferred = assets;
                self.state = previous;
                Err(e)
            },
        }
    }

    fn finalize(&mut self, assets: Vec<DeferredAsset>) -> Result<DeferredPassReport> {
        self.form.save(&self.target)?;

        let pass = DeferredAssetPass::new(assets, self.config.three_d);
        let report = pass.run(&self.target)?;

        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let scratch = tempfile::Builder::new()
            .prefix("temp_")
            .suffix(".pdf")
            .tempfile_in(&dir)?
            .into_temp_path();
        std::fs::rename(&self.target, &scratch)?;

        match AcroFormDocument::load(&scratch) {
            Ok(form) => {
                self.form = form;
                // Replacing an earlier scratch file deletes it.
                self.scratch = Some(scratch);
                Ok(report)
            },
            Err(e) => {
                // The stamped output goes back to the target instead of being deleted.
                scratch.persist(&self.target).map_err(|p| Error::Io(p.error))?;
                Err(e)
            },
        }
    }

    /// Write the document to the target path and end the session.
    pub fn save(mut self) -> Result<PathBuf> {
        self.ensure_writable("save")?;
        if !self.deferred.is_empty() {
            log::warn!(
                "Saving with {} deferred assets that were never placed",
                self.deferred.len()
            );
        }
        self.form.save(&self.target)?;
        if let Some(scratch) = self.scratch.take() {
            scratch.close()?;
        }
        log::info!("Saved {}", self.target.display());
        Ok(self.target)
    }

    fn ensure_writable(&self, action: &str) -> Result<()> {
        if self.state == SessionState::Finalizing {
            return Err(Error::InvalidState(format!(
                "cannot {} while a deferred pass is unfinished",
                action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormSurface;
    use crate::geometry::Rect;
    use crate::policy::FieldPolicy;
    use lopdf::{dictionary, Object};

    fn config_without_fonts(dir: &Path) -> FillConfig {
        FillConfig::default().with_font_folder(dir.join("no-fonts"))
    }

    fn form_with_field(name: &str) -> AcroFormDocument {
        let mut form = AcroFormDocument::new_blank().unwrap();
        let doc = form.document_mut();
        let page = doc.get_pages()[&1];
        let field = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal(name),
            "Subtype" => "Widget",
            "Rect" => vec![72.into(), 600.into(), 272.into(), 700.into()],
            "P" => page,
        });
        doc.get_object_mut(page)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Annots", vec![field.into()]);
        let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        let form_id = doc
            .get_object(root)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"AcroForm")
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_object_mut(form_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Fields", vec![field.into()]);
        form
    }

    #[test]
    fn test_save_without_assets_stays_building() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let mut builder = PdfBuilder::from_form(form_with_field("Name"), &target, config_without_fonts(dir.path()));

        let report = builder.place_deferred_assets().unwrap();
        assert!(report.placed.is_empty());
        assert_eq!(builder.state(), SessionState::Building);

        builder
            .fill_fields(&[RecordField::new("Name", Some("Ada".into()), FieldPolicy::required())])
            .unwrap();
        let saved = builder.save().unwrap();
        assert_eq!(saved, target);

        let reloaded = AcroFormDocument::load(&target).unwrap();
        assert_eq!(reloaded.field_value("Name").as_deref(), Some("Ada"));
    }

    #[test]
    fn test_deferred_round_trip_reopens_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let asset = dir.path().join("part.u3d");
        std::fs::write(&asset, b"U3D\0data").unwrap();

        let mut builder = PdfBuilder::from_form(form_with_field("Model"), &target, config_without_fonts(dir.path()));
        builder
            .fill_fields(&[RecordField::new(
                "Model",
                Some(asset.to_string_lossy().into_owned()),
                FieldPolicy::optional().three_d(),
            )])
            .unwrap();
        assert_eq!(builder.pending_assets().len(), 1);
        assert_eq!(builder.pending_assets()[0].rect, Rect::new(72.0, 600.0, 200.0, 100.0));

        let report = builder.place_deferred_assets().unwrap();
        assert_eq!(report.placed.len(), 1);
        assert_eq!(builder.state(), SessionState::Reopened);
        assert!(!builder.form().has_field("Model"));
        assert!(!target.exists());

        let scratch_count = || {
            std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("temp_"))
                .count()
        };
        assert_eq!(scratch_count(), 1);

        builder.save().unwrap();
        assert!(target.exists());
        assert_eq!(scratch_count(), 0);
    }

    #[test]
    fn test_failed_pass_keeps_session_usable() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let target = out_dir.join("out.pdf");
        let asset = dir.path().join("part.u3d");
        std::fs::write(&asset, b"U3D\0data").unwrap();

        let mut builder = PdfBuilder::from_form(form_with_field("Model"), &target, config_without_fonts(dir.path()));
        builder
            .fill_fields(&[RecordField::new(
                "Model",
                Some(asset.to_string_lossy().into_owned()),
                FieldPolicy::optional().three_d(),
            )])
            .unwrap();

        let err = builder.place_deferred_assets().unwrap_err();
        assert!(matches!(err, Error::Io(_) | Error::Pdf(_)));
        assert_eq!(builder.state(), SessionState::Building);
        assert_eq!(builder.pending_assets().len(), 1);
        builder.fill_fields(&[]).unwrap();

        std::fs::create_dir(&out_dir).unwrap();
        let report = builder.place_deferred_assets().unwrap();
        assert_eq!(report.placed, vec![asset]);
        assert_eq!(builder.state(), SessionState::Reopened);
        builder.save().unwrap();
        assert!(target.exists());
    }

    #[test]
    fn test_drop_removes_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pdf");
        let asset = dir.path().join("part.prc");
        std::fs::write(&asset, b"PRCdata").unwrap();

        {
            let mut builder =
                PdfBuilder::from_form(form_with_field("Model"), &target, config_without_fonts(dir.path()));
            builder
                .fill_fields(&[RecordField::new(
                    "Model",
                    Some(asset.to_string_lossy().into_owned()),
                    FieldPolicy::default().three_d(),
                )])
                .unwrap();
            builder.place_deferred_assets().unwrap();
        }

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("temp_"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
