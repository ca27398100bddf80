//! Field population: applies each record field to the form according to its policy.
//!
//! Decision order for one field, first match wins:
//!
//! 1. `Ignore` presence: skipped.
//! 2. Field not in the form: skipped with a debug log.
//! 3. Value present: filled as multi-line text, plain text, styled text
//!    (in the widget or drawn on the page canvas), an image, or recorded as
//!    a deferred 3D asset.
//! 4. Value absent: `Required` fails the pass, `Optional` removes the field,
//!    `NotAvailable` writes the marker, no presence leaves the field alone.
//!
//! Errors abort the pass immediately; mutations already applied stay.

use crate::config::{FillConfig, MultiLineSizing, VerticalAdjustment};
use crate::deferred::DeferredAsset;
use crate::error::{Error, Result};
use crate::fonts::{FontMetrics, FontRegistry};
use crate::form::{FontSize, FormSurface, TextBlock};
use crate::layout::{fit_font_size, fit_single_line, resolve_anchor};
use crate::policy::{ContentKind, FieldPolicy, FontStyle, Presence, VerticalBand};
use crate::record::RecordField;
use crate::writer::image_handler::{ImageData, ImagePlacement};

/// What happened to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Policy says ignore
    Skipped,
    /// The form has no such field
    NotInForm,
    /// Value written into the widget
    FilledText,
    /// Text drawn on the page and the field removed
    DrawnOnCanvas {
        /// Size used
        font_size: u32,
    },
    /// Multi-line value written with a fitted or fixed size
    FilledMultiLine {
        /// Size used
        font_size: u32,
    },
    /// Image drawn over the widget and the field removed
    PlacedImage,
    /// Geometry recorded for the 3D pass and the field removed
    Deferred,
    /// Optional field without a value, removed
    Removed,
    /// Not-available marker written
    MarkedNotAvailable,
    /// No value and no presence rule
    LeftDefault,
}

/// Outcomes of a populate pass, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateReport {
    /// `(field name, outcome)` pairs
    pub outcomes: Vec<(String, FieldOutcome)>,
}

impl PopulateReport {
    /// Outcome for `name`, if the field was processed.
    pub fn outcome(&self, name: &str) -> Option<FieldOutcome> {
        self.outcomes.iter().find(|(n, _)| n == name).map(|(_, o)| *o)
    }

    /// Number of fields with an outcome matching `pred`.
    pub fn count(&self, pred: impl Fn(&FieldOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    /// Number of processed fields.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if nothing was processed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Drives a [`FormSurface`] through one record.
pub struct FieldPopulator<'a, S: FormSurface + ?Sized> {
    surface: &'a mut S,
    fonts: &'a FontRegistry,
    config: &'a FillConfig,
    deferred: Vec<DeferredAsset>,
}

impl<'a, S: FormSurface + ?Sized> FieldPopulator<'a, S> {
    /// Create a populator.
    pub fn new(surface: &'a mut S, fonts: &'a FontRegistry, config: &'a FillConfig) -> Self {
        Self {
            surface,
            fonts,
            config,
            deferred: Vec::new(),
        }
    }

    /// Apply every field in order.
    pub fn populate(&mut self, fields: &[RecordField]) -> Result<PopulateReport> {
        let aligned = match self.config.multi_line_sizing {
            MultiLineSizing::Aligned => self.aligned_multi_line_size(fields),
            _ => None,
        };
        if let Some(size) = aligned {
            log::debug!("Aligned multi-line size: {}", size);
        }

        let mut report = PopulateReport::default();
        for field in fields {
            let outcome = self.populate_field(field, aligned)?;
            log::debug!("Field '{}': {:?}", field.name, outcome);
            report.outcomes.push((field.name.clone(), outcome));
        }

        log::info!(
            "Populated {} fields ({} not in form, {} deferred)",
            report.len(),
            report.count(|o| *o == FieldOutcome::NotInForm),
            self.deferred.len()
        );
        Ok(report)
    }

    /// Smallest fitted size across multi-line fields that will be auto-sized.
    ///
    /// Fields with an explicit size, no value, or no usable geometry do not
    /// take part; the latter fail later when they are populated.
    pub fn aligned_multi_line_size(&self, fields: &[RecordField]) -> Option<u32> {
        fields
            .iter()
            .filter(|f| f.policy.content == ContentKind::MultiLine && !f.policy.is_ignored())
            .filter(|f| f.policy.font.as_ref().map_or(true, FontStyle::is_autoscale))
            .filter(|f| self.surface.has_field(&f.name))
            .filter_map(|f| {
                let value = f.present_value()?;
                let font = self
                    .fonts
                    .resolve(f.policy.font.as_ref().and_then(|s| s.font_type.as_deref()))
                    .ok()?;
                let widget = self.surface.widget(&f.name).ok()?;
                Some(fit_font_size(
                    value,
                    widget.rect.width,
                    widget.rect.height,
                    font.as_ref(),
                    self.config.multi_line_start_size,
                ))
            })
            .min()
    }

    /// Deferred assets collected so far.
    pub fn deferred(&self) -> &[DeferredAsset] {
        &self.deferred
    }

    /// Finish and hand over the deferred assets.
    pub fn into_deferred(self) -> Vec<DeferredAsset> {
        self.deferred
    }

    fn populate_field(&mut self, field: &RecordField, aligned: Option<u32>) -> Result<FieldOutcome> {
        let policy = &field.policy;
        let name = field.name.as_str();

        if policy.is_ignored() {
            return Ok(FieldOutcome::Skipped);
        }
        if !self.surface.has_field(name) {
            log::debug!("Field '{}' is not in the form", name);
            return Ok(FieldOutcome::NotInForm);
        }

        match field.present_value() {
            Some(value) => self.fill_present(name, value, policy, aligned),
            None => self.fill_absent(name, policy),
        }
    }

    fn fill_present(&mut self, name: &str, value: &str, policy: &FieldPolicy, aligned: Option<u32>) -> Result<FieldOutcome> {
        match policy.content {
            ContentKind::MultiLine => self.fill_multi_line(name, value, policy.font.as_ref(), aligned),
            ContentKind::Image => self.place_image(name, value.trim(), policy),
            ContentKind::ThreeD => self.defer_asset(name, value.trim()),
            ContentKind::Text => match &policy.font {
                None => {
                    self.fill_plain_text(name, value)?;
                    Ok(FieldOutcome::FilledText)
                },
                Some(style) => self.fill_styled_text(name, value, style),
            },
        }
    }

    fn fill_absent(&mut self, name: &str, policy: &FieldPolicy) -> Result<FieldOutcome> {
        match policy.presence {
            Some(Presence::Required) => Err(Error::MissingValue(name.to_string())),
            Some(Presence::Optional) => {
                self.surface.remove_field(name)?;
                Ok(FieldOutcome::Removed)
            },
            Some(Presence::NotAvailable) => {
                let marker = self.config.not_available_marker.clone();
                self.fill_plain_text(name, &marker)?;
                Ok(FieldOutcome::MarkedNotAvailable)
            },
            Some(Presence::Ignore) => Ok(FieldOutcome::Skipped),
            None => Ok(FieldOutcome::LeftDefault),
        }
    }

    /// Value in the default font, autoscaled, read-only.
    fn fill_plain_text(&mut self, name: &str, value: &str) -> Result<()> {
        let font = self.fonts.resolve(None)?;
        self.surface.set_text_value(name, value)?;
        self.surface.set_font(name, &font)?;
        self.surface.set_font_size(name, FontSize::Auto)?;
        self.surface.set_read_only(name)
    }

    fn fill_multi_line(
        &mut self,
        name: &str,
        value: &str,
        style: Option<&FontStyle>,
        aligned: Option<u32>,
    ) -> Result<FieldOutcome> {
        let font = self.fonts.resolve(style.and_then(|s| s.font_type.as_deref()))?;

        let size = match style.map(|s| s.size).filter(|size| *size > 0) {
            Some(explicit) => explicit,
            None => match (self.config.multi_line_sizing, aligned) {
                (MultiLineSizing::Fixed(size), _) => size.max(1),
                (MultiLineSizing::Aligned, Some(size)) => size,
                _ => {
                    let widget = self.surface.widget(name)?;
                    fit_font_size(
                        value,
                        widget.rect.width,
                        widget.rect.height,
                        font.as_ref(),
                        self.config.multi_line_start_size,
                    )
                },
            },
        };

        self.surface.set_text_value(name, value)?;
        self.surface.set_font(name, &font)?;
        self.surface.set_font_size(name, FontSize::Fixed(size))?;
        if let Some(style) = style {
            self.surface.set_color(name, style.color)?;
        }
        Ok(FieldOutcome::FilledMultiLine { font_size: size })
    }

    fn fill_styled_text(&mut self, name: &str, value: &str, style: &FontStyle) -> Result<FieldOutcome> {
        let warning = style.warning.as_ref().filter(|w| w.matches(value));
        let color = match warning {
            Some(expression) => {
                log::debug!("Warning '{}' matched field '{}'", expression, name);
                self.config.warning_color
            },
            None => style.color,
        };

        self.surface.set_text_value(name, value)?;
        self.surface.set_read_only(name)?;

        let font = self.fonts.resolve(style.font_type.as_deref())?;
        let justification = style.justification;

        if justification.is_native_to_widget() {
            self.surface.set_justification(name, justification.align())?;
            self.surface.set_font(name, &font)?;
            self.surface.set_font_size(name, FontSize::from_policy(style.size))?;
            self.surface.set_color(name, color)?;
            return Ok(FieldOutcome::FilledText);
        }

        let widget = self.surface.widget(name)?;
        let rect = widget.rect;
        let line = single_line(value);
        let size = if style.size > 0 {
            style.size
        } else {
            fit_single_line(&line, rect.width, rect.height, font.as_ref(), self.config.canvas_start_size)
        };

        let pts = size as f32;
        let text_width = font.width(&line, pts);
        let ascent = font.ascent(&line, pts);
        let descent = font.descent(&line, pts);
        let anchor = resolve_anchor(justification, &rect, text_width, ascent - descent);

        let baseline = match (self.config.vertical_adjustment, justification.band()) {
            (VerticalAdjustment::WidthRatioAscent, VerticalBand::Center) if rect.width > 0.0 => {
                rect.center().y - (text_width / rect.width) * ascent
            },
            _ => anchor.y - descent,
        };

        let block = TextBlock {
            text: line,
            font,
            size: pts,
            color,
            x: anchor.x,
            baseline,
        };
        self.surface.draw_text_block_at(widget.page, &block)?;
        self.surface.remove_field(name)?;
        Ok(FieldOutcome::DrawnOnCanvas { font_size: size })
    }

    fn place_image(&mut self, name: &str, path: &str, policy: &FieldPolicy) -> Result<FieldOutcome> {
        let widget = self.surface.widget(name)?;
        let image = ImageData::from_file(path)?;

        let (width, height) = image.fit_to_box(widget.rect.width, widget.rect.height);
        let anchor = resolve_anchor(policy.image_justification, &widget.rect, width, height);
        let placement = ImagePlacement::new(anchor.x, anchor.y, width, height);

        self.surface.draw_image_at(widget.page, &image, &placement)?;
        self.surface.remove_field(name)?;
        Ok(FieldOutcome::PlacedImage)
    }

    fn defer_asset(&mut self, name: &str, path: &str) -> Result<FieldOutcome> {
        let widget = self.surface.widget(name)?;
        self.deferred.push(DeferredAsset::new(widget.rect, widget.page, path));
        self.surface.remove_field(name)?;
        Ok(FieldOutcome::Deferred)
    }
}

/// Canvas text is drawn as one `Tj`; line breaks become single spaces.
fn single_line(value: &str) -> String {
    value
        .split(|c| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
