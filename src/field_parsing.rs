use crate::field_discovery::DiscoveredField;
use crate::{pdf_utils, FieldType, PdfField};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;

/// `/Ff` bit 2: the field must have a value before the form is submitted.
pub(crate) const FLAG_REQUIRED: i64 = 1 << 1;
/// `/Ff` bit 16: a button field that behaves as a radio group.
pub(crate) const FLAG_RADIO: i64 = 1 << 15;
/// `/Ff` bit 17: a push button with no persistent value.
pub(crate) const FLAG_PUSHBUTTON: i64 = 1 << 16;

/// Turns discovered AcroForm fields into [`PdfField`] values.
///
/// This module contains logic to:
/// - Map `/FT` and `/Ff` to a [`FieldType`]
/// - Read the current value and the available choices
/// - Locate the page a field is drawn on
pub(crate) struct FieldParser<'a> {
    document: &'a Document,
    page_index: BTreeMap<ObjectId, usize>,
}

impl<'a> FieldParser<'a> {
    pub fn new(document: &'a Document) -> Self {
        let page_index = document
            .get_pages()
            .values()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        Self {
            document,
            page_index,
        }
    }

    pub fn parse(&self, field: &DiscoveredField) -> PdfField {
        let field_type = Self::field_type(field);
        let options = match field_type {
            FieldType::Dropdown => self.choice_options(field.id),
            FieldType::Radio => {
                let listed = self.choice_options(field.id);
                if listed.is_empty() {
                    self.radio_states(field)
                } else {
                    listed
                }
            }
            _ => Vec::new(),
        };

        PdfField {
            name: field.name.clone(),
            field_type,
            value: field
                .value
                .as_ref()
                .and_then(|v| pdf_utils::object_to_text(self.document, v)),
            options,
            page: self.page_of(field),
            required: field.flags & FLAG_REQUIRED != 0,
        }
    }

    pub(crate) fn field_type(field: &DiscoveredField) -> FieldType {
        match field.field_type.as_deref() {
            Some(b"Tx") => FieldType::Text,
            Some(b"Btn") if field.flags & FLAG_PUSHBUTTON != 0 => FieldType::Unknown,
            Some(b"Btn") if field.flags & FLAG_RADIO != 0 => FieldType::Radio,
            Some(b"Btn") => FieldType::Checkbox,
            Some(b"Ch") => FieldType::Dropdown,
            Some(b"Sig") => FieldType::Signature,
            _ => FieldType::Unknown,
        }
    }

    /// Read `/Opt`. Pair entries `[export display]` contribute their display
    /// text.
    fn choice_options(&self, id: ObjectId) -> Vec<String> {
        let Some(dict) = self.dict(id) else {
            return Vec::new();
        };
        let Some(opts) = dict
            .get(b"Opt")
            .ok()
            .and_then(|v| pdf_utils::resolve_array(self.document, v))
        else {
            return Vec::new();
        };

        opts.iter()
            .filter_map(|opt| match opt {
                Object::Array(pair) if pair.len() >= 2 => {
                    pdf_utils::object_to_text(self.document, &pair[1])
                }
                other => pdf_utils::object_to_text(self.document, other),
            })
            .collect()
    }

    /// Export names of a radio group: the "on" appearance state of each
    /// widget, in widget order.
    fn radio_states(&self, field: &DiscoveredField) -> Vec<String> {
        let mut states: Vec<String> = Vec::new();
        for widget in &field.widgets {
            for state in on_states(self.document, *widget) {
                if !states.contains(&state) {
                    states.push(state);
                }
            }
        }
        states
    }

    /// Zero-based page of the first widget: from its `/P` entry, else by
    /// searching each page's `/Annots`. Defaults to 0.
    fn page_of(&self, field: &DiscoveredField) -> usize {
        for widget in &field.widgets {
            let from_parent = self
                .dict(*widget)
                .and_then(|d| d.get(b"P").ok())
                .and_then(|p| p.as_reference().ok())
                .and_then(|p| self.page_index.get(&p).copied());
            if let Some(page) = from_parent {
                return page;
            }
        }

        for (page_id, index) in &self.page_index {
            let annots = self
                .dict(*page_id)
                .and_then(|d| d.get(b"Annots").ok())
                .and_then(|a| pdf_utils::resolve_array(self.document, a));
            if let Some(annots) = annots {
                let holds_widget = annots
                    .iter()
                    .filter_map(|a| a.as_reference().ok())
                    .any(|a| field.widgets.contains(&a));
                if holds_widget {
                    return *index;
                }
            }
        }
        0
    }

    fn dict(&self, id: ObjectId) -> Option<&'a Dictionary> {
        self.document.get_object(id).ok()?.as_dict().ok()
    }
}

/// Names of a widget's normal appearance states other than `Off`.
pub(crate) fn on_states(document: &Document, widget: ObjectId) -> Vec<String> {
    let normal = document
        .get_object(widget)
        .ok()
        .and_then(|o| o.as_dict().ok())
        .and_then(|d| d.get(b"AP").ok())
        .and_then(|ap| pdf_utils::resolve_dict(document, ap))
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|n| pdf_utils::resolve_dict(document, n));

    normal
        .map(|n| {
            n.iter()
                .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
                .filter(|key| key != "Off")
                .collect()
        })
        .unwrap_or_default()
}
