//! AcroForm access over a live `lopdf` document.
//!
//! See ISO 32000-1:2008, Section 12.7 - Interactive Forms.
//!
//! Fields are located by walking `/AcroForm /Fields` on every lookup, so a
//! removal or a reload is always reflected. Appearance streams are never
//! generated; `/NeedAppearances` is set instead and stale `/AP` entries are
//! dropped from edited widgets.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use super::appearance::{AppearanceColor, DefaultAppearance, FieldFlags};
use super::{FontSize, FormSurface, TextBlock, Widget};
use crate::error::{Error, Result};
use crate::fonts::PdfFont;
use crate::geometry::Rect;
use crate::policy::{FontColor, HorizontalAlign};
use crate::writer::image_handler::{ImageData, ImagePlacement};
use crate::writer::page_content::{self, dict_slot, number, resolve_array};

/// Guard against cyclic `/Kids` and `/Parent` chains.
const MAX_FIELD_DEPTH: usize = 32;

/// A terminal field and where it hangs in the hierarchy.
#[derive(Debug, Clone)]
struct FieldNode {
    id: ObjectId,
    parent: Option<ObjectId>,
    /// Widget annotations; the field itself when field and widget are merged
    widgets: Vec<ObjectId>,
}

/// A PDF form opened for population.
pub struct AcroFormDocument {
    doc: Document,
    form_id: ObjectId,
    /// Font dictionaries already written, by font key
    fonts: HashMap<String, ObjectId>,
    /// Pages whose existing content has been wrapped in `q`/`Q`
    isolated_pages: HashSet<ObjectId>,
}

impl std::fmt::Debug for AcroFormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcroFormDocument")
            .field("pages", &self.doc.get_pages().len())
            .field("form_id", &self.form_id)
            .finish()
    }
}

impl AcroFormDocument {
    /// Load a PDF file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let doc = Document::load(path)?;
        Self::from_document(doc)
    }

    /// Wrap a document that has an `/AcroForm` dictionary.
    ///
    /// An inline `/AcroForm` is moved into its own object.
    pub fn from_document(mut doc: Document) -> Result<Self> {
        let catalog_id = doc
            .trailer
            .get(b"Root")?
            .as_reference()
            .map_err(|_| Error::InvalidPdf("trailer /Root is not a reference".into()))?;

        let form = doc.get_object(catalog_id)?.as_dict()?.get(b"AcroForm").cloned();
        let form_id = match form {
            Ok(Object::Reference(id)) => id,
            Ok(Object::Dictionary(dict)) => {
                let id = doc.add_object(dict);
                doc.get_object_mut(catalog_id)?.as_dict_mut()?.set("AcroForm", id);
                id
            },
            _ => return Err(Error::InvalidPdf("document has no /AcroForm".into())),
        };

        Ok(Self {
            doc,
            form_id,
            fonts: HashMap::new(),
            isolated_pages: HashSet::new(),
        })
    }

    /// One empty Letter page and an empty form.
    pub fn new_blank() -> Result<Self> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let form_id = doc.add_object(dictionary! { "Fields" => Vec::<Object>::new() });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => form_id,
        });
        doc.trailer.set("Root", catalog_id);
        Self::from_document(doc)
    }

    /// The underlying document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for page-level edits outside the form.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Unwrap the document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Write the document to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.doc.save(path)?;
        Ok(())
    }

    /// Full names of all terminal fields, in document order.
    pub fn field_names(&self) -> Vec<String> {
        self.collect_fields().into_iter().map(|(name, _)| name).collect()
    }

    /// Current `/V` of a text field, decoded.
    pub fn field_value(&self, name: &str) -> Option<String> {
        let node = self.find_field(name)?;
        let dict = self.doc.get_object(node.id).ok()?.as_dict().ok()?;
        decode_text_string(dict.get(b"V").ok()?.as_str().ok()?)
    }

    /// Effective field flags, including inherited `/Ff`.
    pub fn field_flags(&self, name: &str) -> Option<FieldFlags> {
        let node = self.find_field(name)?;
        let ff = self.inherited(node.id, b"Ff")?.as_i64().ok()?;
        Some(FieldFlags::from_bits_truncate(ff as u32))
    }

    /// Effective default appearance.
    pub fn default_appearance(&self, name: &str) -> Option<DefaultAppearance> {
        let node = self.find_field(name)?;
        Some(self.effective_da(node.id))
    }

    fn form(&self) -> Option<&Dictionary> {
        self.doc.get_object(self.form_id).ok()?.as_dict().ok()
    }

    /// Field references directly under `/Fields`.
    fn root_fields(&self) -> Vec<ObjectId> {
        self.form()
            .and_then(|form| form.get(b"Fields").ok())
            .and_then(|fields| resolve_array(&self.doc, fields))
            .map(|fields| references(fields))
            .unwrap_or_default()
    }

    fn collect_fields(&self) -> Vec<(String, FieldNode)> {
        let mut out = Vec::new();
        for id in self.root_fields() {
            self.walk(id, None, "", 0, &mut out);
        }
        out
    }

    fn walk(&self, id: ObjectId, parent: Option<ObjectId>, prefix: &str, depth: usize, out: &mut Vec<(String, FieldNode)>) {
        if depth > MAX_FIELD_DEPTH {
            log::warn!("Field tree deeper than {} levels below '{}', ignoring the rest", MAX_FIELD_DEPTH, prefix);
            return;
        }
        let Some(dict) = self.doc.get_object(id).ok().and_then(|o| o.as_dict().ok()) else {
            return;
        };

        let partial = dict
            .get(b"T")
            .ok()
            .and_then(|t| t.as_str().ok())
            .and_then(decode_text_string);
        let name = match partial {
            Some(partial) if prefix.is_empty() => partial,
            Some(partial) => format!("{}.{}", prefix, partial),
            None => prefix.to_string(),
        };

        let kids = dict
            .get(b"Kids")
            .ok()
            .and_then(|kids| resolve_array(&self.doc, kids))
            .map(|kids| references(kids))
            .unwrap_or_default();
        let (child_fields, widgets): (Vec<ObjectId>, Vec<ObjectId>) = kids.into_iter().partition(|kid| {
            self.doc
                .get_object(*kid)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .is_some_and(|d| d.has(b"T"))
        });

        if child_fields.is_empty() {
            let is_widget = dict
                .get(b"Subtype")
                .ok()
                .and_then(|s| s.as_name().ok())
                .is_some_and(|s| s == b"Widget");
            let widgets = if widgets.is_empty() && (is_widget || dict.has(b"Rect")) {
                vec![id]
            } else {
                widgets
            };
            out.push((name, FieldNode { id, parent, widgets }));
        } else {
            for child in child_fields {
                self.walk(child, Some(id), &name, depth + 1, out);
            }
        }
    }

    /// Remove `id` and its ancestors for as long as they are left without kids.
    fn prune_empty_ancestors(&mut self, id: ObjectId) -> Result<()> {
        let mut current = id;
        for _ in 0..MAX_FIELD_DEPTH {
            let dict = self.doc.get_object(current)?.as_dict()?;
            let has_kids = dict
                .get(b"Kids")
                .ok()
                .and_then(|kids| resolve_array(&self.doc, kids))
                .is_some_and(|kids| !kids.is_empty());
            if has_kids {
                return Ok(());
            }
            let parent = dict.get(b"Parent").ok().and_then(|p| p.as_reference().ok());

            match parent {
                Some(parent) => page_content::remove_reference(&mut self.doc, parent, b"Kids", current)?,
                None => page_content::remove_reference(&mut self.doc, self.form_id, b"Fields", current)?,
            };
            self.doc.objects.remove(&current);
            log::debug!("Removed empty field node {:?}", current);

            match parent {
                Some(parent) => current = parent,
                None => return Ok(()),
            }
        }
        Ok(())
    }

    fn find_field(&self, name: &str) -> Option<FieldNode> {
        self.collect_fields()
            .into_iter()
            .find(|(full, _)| full == name)
            .map(|(_, node)| node)
    }

    fn require_field(&self, name: &str) -> Result<FieldNode> {
        self.find_field(name)
            .ok_or_else(|| Error::InvalidState(format!("field '{}' is not in the form", name)))
    }

    /// Value of `key` on the field or the nearest ancestor that has it.
    fn inherited(&self, id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = id;
        for _ in 0..MAX_FIELD_DEPTH {
            let dict = self.doc.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn effective_da(&self, id: ObjectId) -> DefaultAppearance {
        self.inherited(id, b"DA")
            .or_else(|| self.form().and_then(|form| form.get(b"DA").ok()))
            .and_then(|da| da.as_str().ok())
            .map(|bytes| DefaultAppearance::parse(&String::from_utf8_lossy(bytes)))
            .unwrap_or_default()
    }

    /// Rewrite the field's `/DA` through `edit`.
    fn update_da(&mut self, name: &str, edit: impl FnOnce(&mut DefaultAppearance)) -> Result<()> {
        let node = self.require_field(name)?;
        let mut da = self.effective_da(node.id);
        edit(&mut da);
        let encoded = Object::string_literal(da.to_string());

        self.doc.get_object_mut(node.id)?.as_dict_mut()?.set("DA", encoded.clone());
        for widget in node.widgets.iter().filter(|w| **w != node.id) {
            let dict = self.doc.get_object_mut(*widget)?.as_dict_mut()?;
            if dict.has(b"DA") {
                dict.set("DA", encoded.clone());
            }
        }
        self.invalidate_appearance(&node)
    }

    /// Drop cached appearances and ask viewers to regenerate them.
    fn invalidate_appearance(&mut self, node: &FieldNode) -> Result<()> {
        for widget in &node.widgets {
            if let Ok(dict) = self.doc.get_object_mut(*widget).and_then(Object::as_dict_mut) {
                dict.remove(b"AP");
            }
        }
        self.doc
            .get_object_mut(self.form_id)?
            .as_dict_mut()?
            .set("NeedAppearances", true);
        Ok(())
    }

    /// Font dictionary for `font`, written once per document.
    fn font_object(&mut self, font: &PdfFont) -> ObjectId {
        if let Some(id) = self.fonts.get(font.key()) {
            return *id;
        }
        let id = font.add_to_document(&mut self.doc);
        self.fonts.insert(font.key().to_string(), id);
        id
    }

    /// Register `font` under `/DR /Font` and return its resource name.
    fn register_form_font(&mut self, font: &PdfFont) -> Result<String> {
        let resource = font.resource_name();
        let font_id = self.font_object(font);
        let form_id = self.form_id;

        let fonts_ref = {
            let dr = dict_slot(&mut self.doc, form_id, b"DR")?;
            match dr.get(b"Font") {
                Ok(Object::Reference(id)) => Some(*id),
                Ok(Object::Dictionary(_)) => None,
                _ => {
                    dr.set("Font", Dictionary::new());
                    None
                },
            }
        };
        let fonts = match fonts_ref {
            Some(id) => self.doc.get_object_mut(id)?.as_dict_mut()?,
            None => dict_slot(&mut self.doc, form_id, b"DR")?.get_mut(b"Font")?.as_dict_mut()?,
        };
        if !fonts.has(resource.as_bytes()) {
            fonts.set(resource.as_str(), font_id);
        }
        Ok(resource)
    }

    fn widget_page(&self, widget: ObjectId) -> Option<ObjectId> {
        let pages = page_content::page_ids(&self.doc);
        let declared = self
            .doc
            .get_object(widget)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"P").ok())
            .and_then(|p| p.as_reference().ok())
            .filter(|p| pages.contains(p));
        declared.or_else(|| {
            pages
                .into_iter()
                .find(|page| page_content::page_has_annotation(&self.doc, *page, widget))
        })
    }

    fn page_for_drawing(&mut self, page: u32) -> Result<(ObjectId, bool)> {
        let page_id = page_content::page_id(&self.doc, page)?;
        let isolate = self.isolated_pages.insert(page_id);
        Ok((page_id, isolate))
    }
}

impl FormSurface for AcroFormDocument {
    fn has_field(&self, name: &str) -> bool {
        self.find_field(name).is_some()
    }

    fn widget(&self, name: &str) -> Result<Widget> {
        let node = self
            .find_field(name)
            .ok_or_else(|| Error::missing_geometry(name, "field is not in the form"))?;
        let widget = *node
            .widgets
            .first()
            .ok_or_else(|| Error::missing_geometry(name, "field has no widget annotation"))?;

        let dict = self.doc.get_object(widget)?.as_dict()?;
        let coords: Vec<f32> = dict
            .get(b"Rect")
            .ok()
            .and_then(|r| resolve_array(&self.doc, r))
            .map(|r| r.iter().filter_map(number).collect())
            .unwrap_or_default();
        let &[x0, y0, x1, y1] = coords.as_slice() else {
            return Err(Error::missing_geometry(name, "widget has no /Rect"));
        };

        let page_id = self
            .widget_page(widget)
            .ok_or_else(|| Error::missing_geometry(name, "widget is not placed on any page"))?;
        let page = page_content::page_number(&self.doc, page_id)
            .ok_or_else(|| Error::missing_geometry(name, "widget page is not in the page tree"))?;

        Ok(Widget {
            rect: Rect::from_points(x0, y0, x1, y1),
            page,
        })
    }

    fn set_text_value(&mut self, name: &str, value: &str) -> Result<()> {
        let node = self.require_field(name)?;
        self.doc
            .get_object_mut(node.id)?
            .as_dict_mut()?
            .set("V", Object::string_literal(encode_text_string(value)));
        self.invalidate_appearance(&node)
    }

    fn set_font(&mut self, name: &str, font: &PdfFont) -> Result<()> {
        let resource = self.register_form_font(font)?;
        self.update_da(name, |da| da.font = Some(resource))
    }

    fn set_font_size(&mut self, name: &str, size: FontSize) -> Result<()> {
        self.update_da(name, |da| {
            da.size = size.points();
        })
    }

    fn set_color(&mut self, name: &str, color: FontColor) -> Result<()> {
        self.update_da(name, |da| da.color = Some(AppearanceColor::Rgb(color.rgb())))
    }

    fn set_read_only(&mut self, name: &str) -> Result<()> {
        let node = self.require_field(name)?;
        let current = self
            .inherited(node.id, b"Ff")
            .and_then(|ff| ff.as_i64().ok())
            .map(|ff| FieldFlags::from_bits_retain(ff as u32))
            .unwrap_or(FieldFlags::empty());
        let flags = current | FieldFlags::READ_ONLY;
        self.doc
            .get_object_mut(node.id)?
            .as_dict_mut()?
            .set("Ff", flags.bits() as i64);
        Ok(())
    }

    fn set_justification(&mut self, name: &str, align: HorizontalAlign) -> Result<()> {
        let node = self.require_field(name)?;
        self.doc
            .get_object_mut(node.id)?
            .as_dict_mut()?
            .set("Q", align.quadding());
        self.invalidate_appearance(&node)
    }

    fn remove_field(&mut self, name: &str) -> Result<()> {
        let node = self.require_field(name)?;
        let pages = page_content::page_ids(&self.doc);

        for widget in &node.widgets {
            for page in &pages {
                page_content::remove_annotation(&mut self.doc, *page, *widget)?;
            }
        }

        let detached = match node.parent {
            Some(parent) => page_content::remove_reference(&mut self.doc, parent, b"Kids", node.id)?,
            None => page_content::remove_reference(&mut self.doc, self.form_id, b"Fields", node.id)?,
        };
        if !detached {
            log::warn!("Field '{}' was not referenced by its parent", name);
        }

        for widget in &node.widgets {
            self.doc.objects.remove(widget);
        }
        self.doc.objects.remove(&node.id);
        if let Some(parent) = node.parent {
            self.prune_empty_ancestors(parent)?;
        }
        log::debug!("Removed field '{}' ({} widgets)", name, node.widgets.len());
        Ok(())
    }

    fn draw_image_at(&mut self, page: u32, image: &ImageData, placement: &ImagePlacement) -> Result<()> {
        let (page_id, isolate) = self.page_for_drawing(page)?;
        let xobject = image.add_to_document(&mut self.doc);
        let resource = format!("PFIm{}", xobject.0);
        page_content::add_page_resource(&mut self.doc, page_id, "XObject", &resource, xobject)?;
        let ops = page_content::xobject_operations(&resource, placement.transform_matrix());
        page_content::append_content(&mut self.doc, page_id, ops, isolate)
    }

    fn draw_text_block_at(&mut self, page: u32, block: &TextBlock) -> Result<()> {
        let (page_id, isolate) = self.page_for_drawing(page)?;
        let font_id = self.font_object(&block.font);
        let resource = block.font.resource_name();
        page_content::add_page_resource(&mut self.doc, page_id, "Font", &resource, font_id)?;
        let ops = page_content::text_operations(
            &resource,
            block.size,
            block.color.rgb(),
            block.x,
            block.baseline,
            block.font.encode_text(&block.text),
        );
        page_content::append_content(&mut self.doc, page_id, ops, isolate)
    }
}

fn references(items: &[Object]) -> Vec<ObjectId> {
    items.iter().filter_map(|o| o.as_reference().ok()).collect()
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> Option<String> {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    } else {
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Encode a PDF text string. Printable Latin-1 stays single-byte; anything
/// else switches the whole string to UTF-16BE with BOM.
pub fn encode_text_string(text: &str) -> Vec<u8> {
    let single_byte = text
        .chars()
        .all(|ch| (ch as u32) < 0x80 || (0xA0..=0xFF).contains(&(ch as u32)));
    if single_byte {
        text.chars().map(|ch| ch as u8).collect()
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontRegistry, StandardFont};

    /// One page with a root text field "Name" (merged widget) and a
    /// hierarchical "Address.City" whose widget is a separate kid.
    fn sample_form() -> (AcroFormDocument, ObjectId) {
        let mut form = AcroFormDocument::new_blank().unwrap();
        let doc = form.document_mut();
        let page_id = page_content::page_id(doc, 1).unwrap();

        let name_id = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("Name"),
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => vec![100.into(), 700.into(), 300.into(), 720.into()],
            "P" => page_id,
            "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
            "AP" => dictionary! {},
        });
        let address_id = doc.new_object_id();
        let city_id = doc.new_object_id();
        let city_widget = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => city_id,
            "Rect" => vec![300.into(), 600.into(), 100.into(), 580.into()],
        });
        doc.objects.insert(
            city_id,
            Object::Dictionary(dictionary! {
                "FT" => "Tx",
                "T" => Object::string_literal("City"),
                "Parent" => address_id,
                "Ff" => 4096,
                "Kids" => vec![city_widget.into()],
            }),
        );
        doc.objects.insert(
            address_id,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal("Address"),
                "Kids" => vec![city_id.into()],
            }),
        );
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Annots", vec![name_id.into(), city_widget.into()]);
        let form_id = form.form_id;
        form.document_mut()
            .get_object_mut(form_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Fields", vec![name_id.into(), address_id.into()]);
        (form, page_id)
    }

    #[test]
    fn test_field_names_are_full_names() {
        let (form, _) = sample_form();
        assert_eq!(form.field_names(), vec!["Name".to_string(), "Address.City".to_string()]);
        assert!(form.has_field("Address.City"));
        assert!(!form.has_field("City"));
        assert!(!form.has_field("name"));
    }

    #[test]
    fn test_widget_geometry() {
        let (form, _) = sample_form();
        let name = form.widget("Name").unwrap();
        assert_eq!(name.rect, Rect::new(100.0, 700.0, 200.0, 20.0));
        assert_eq!(name.page, 1);

        // Found through the page's /Annots since it has no /P.
        let city = form.widget("Address.City").unwrap();
        assert_eq!(city.rect, Rect::new(100.0, 580.0, 200.0, 20.0));
        assert_eq!(city.page, 1);
    }

    #[test]
    fn test_widget_without_page_is_missing_geometry() {
        let (mut form, page_id) = sample_form();
        let city_widget = form.find_field("Address.City").unwrap().widgets[0];
        page_content::remove_annotation(form.document_mut(), page_id, city_widget).unwrap();

        match form.widget("Address.City") {
            Err(Error::MissingWidgetGeometry { field, .. }) => assert_eq!(field, "Address.City"),
            other => panic!("expected missing geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_set_value_and_flags() {
        let (mut form, _) = sample_form();
        form.set_text_value("Name", "Zoë").unwrap();
        form.set_read_only("Address.City").unwrap();

        assert_eq!(form.field_value("Name").as_deref(), Some("Zoë"));
        let flags = form.field_flags("Address.City").unwrap();
        assert!(flags.contains(FieldFlags::READ_ONLY | FieldFlags::MULTILINE));

        let dict = form.document().get_object(form.form_id).unwrap().as_dict().unwrap();
        assert!(dict.get(b"NeedAppearances").unwrap().as_bool().unwrap());
        let widget = form.find_field("Name").unwrap().id;
        assert!(!form.document().get_object(widget).unwrap().as_dict().unwrap().has(b"AP"));
    }

    #[test]
    fn test_appearance_edits() {
        let (mut form, _) = sample_form();
        let courier = PdfFont::standard(StandardFont::by_name("Courier").unwrap());

        form.set_font("Name", &courier).unwrap();
        form.set_font_size("Name", FontSize::Fixed(11)).unwrap();
        form.set_color("Name", FontColor::Red).unwrap();
        form.set_justification("Name", HorizontalAlign::Right).unwrap();

        let da = form.default_appearance("Name").unwrap();
        assert_eq!(da.font.as_deref(), Some("PF_Courier"));
        assert_eq!(da.size, 11.0);
        assert_eq!(da.color, Some(AppearanceColor::Rgb([1.0, 0.0, 0.0])));

        let node = form.find_field("Name").unwrap();
        let dict = form.document().get_object(node.id).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Q").unwrap().as_i64().unwrap(), 2);

        let form_dict = form.form().unwrap();
        let dr = form_dict.get(b"DR").unwrap().as_dict().unwrap();
        assert!(dr.get(b"Font").unwrap().as_dict().unwrap().has(b"PF_Courier"));
    }

    #[test]
    fn test_remove_field_detaches_everywhere() {
        let (mut form, page_id) = sample_form();
        let city = form.find_field("Address.City").unwrap();

        form.remove_field("Address.City").unwrap();
        form.remove_field("Name").unwrap();

        assert!(form.field_names().is_empty());
        assert!(!page_content::page_has_annotation(form.document(), page_id, city.widgets[0]));
        assert!(form.document().get_object(city.id).is_err());
    }

    #[test]
    fn test_removing_last_child_prunes_parent() {
        let (mut form, _) = sample_form();
        let address = form.find_field("Address.City").unwrap().parent.unwrap();

        form.remove_field("Address.City").unwrap();

        assert_eq!(form.field_names(), vec!["Name".to_string()]);
        assert!(!form.has_field("Address"));
        assert!(form.document().get_object(address).is_err());
        let fields = form.form().unwrap().get(b"Fields").unwrap().as_array().unwrap();
        assert!(!fields.iter().any(|f| matches!(f, Object::Reference(id) if *id == address)));
    }

    #[test]
    fn test_removing_one_child_keeps_siblings() {
        let (mut form, page_id) = sample_form();
        let address = form.find_field("Address.City").unwrap().parent.unwrap();
        let doc = form.document_mut();
        let zip = doc.add_object(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("Zip"),
            "Parent" => address,
            "Subtype" => "Widget",
            "Rect" => vec![100.into(), 550.into(), 200.into(), 570.into()],
            "P" => page_id,
        });
        doc.get_object_mut(address)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .get_mut(b"Kids")
            .unwrap()
            .as_array_mut()
            .unwrap()
            .push(zip.into());

        form.remove_field("Address.City").unwrap();

        assert!(form.has_field("Address.Zip"));
        assert!(!form.has_field("Address"));
        assert!(form.document().get_object(address).is_ok());
        assert!(form.widget("Address.Zip").is_ok());
    }

    #[test]
    fn test_draw_text_block_adds_font_resource() {
        let (mut form, page_id) = sample_form();
        let fonts = FontRegistry::default();
        let block = TextBlock {
            text: "Hello".into(),
            font: fonts.resolve(None).unwrap(),
            size: 10.0,
            color: FontColor::Black,
            x: 100.0,
            baseline: 705.0,
        };

        form.draw_text_block_at(1, &block).unwrap();
        form.draw_text_block_at(1, &block).unwrap();

        let page = form.document().get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.get(b"Font").unwrap().as_dict().unwrap().has(b"PF_Helvetica"));
        // Blank pages have no prior content to isolate: two appended streams.
        assert_eq!(page.get(b"Contents").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_draw_on_missing_page_fails() {
        let (mut form, _) = sample_form();
        let image = ImageData {
            width: 1,
            height: 1,
            color_space: crate::writer::image_handler::ColorSpace::DeviceGray,
            encoding: crate::writer::image_handler::ImageEncoding::Flate,
            data: vec![0],
            soft_mask: None,
        };
        let result = form.draw_image_at(3, &image, &ImagePlacement::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(result, Err(Error::InvalidPdf(_))));
    }

    #[test]
    fn test_missing_acroform_is_invalid() {
        let mut doc = Document::with_version("1.5");
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog" });
        doc.trailer.set("Root", catalog);
        assert!(matches!(AcroFormDocument::from_document(doc), Err(Error::InvalidPdf(_))));
    }

    #[test]
    fn test_text_string_encoding() {
        assert_eq!(encode_text_string("abc"), b"abc".to_vec());
        assert_eq!(encode_text_string("é"), vec![0xE9]);
        let utf16 = encode_text_string("€5");
        assert_eq!(&utf16[..2], &[0xFE, 0xFF]);
        assert_eq!(decode_text_string(&utf16).as_deref(), Some("€5"));
        assert_eq!(decode_text_string(&[0x41, 0xE9]).as_deref(), Some("Aé"));
    }
}
