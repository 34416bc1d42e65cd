use crate::field_discovery::DiscoveredField;
use crate::field_parsing::{on_states, FieldParser};
use crate::{FieldType, FilerError, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Prefixes that form designers put in front of every field name. Stripped
/// in this order, each at most once.
const FORM_PREFIXES: [&str; 3] = ["form1[0].", "topmostsubform[0].", "page1[0]."];

/// Checkbox values that mean "checked".
const TRUTHY: [&str; 6] = ["yes", "true", "1", "x", "on", "checked"];

/// Normalize a field name or profile key for matching: lowercase, strip the
/// usual form prefixes, then drop `_`, `-`, spaces and dots.
///
/// ```
/// assert_eq!(formfile::normalize_key("form1[0].Page1[0].First_Name"), "firstname");
/// assert_eq!(formfile::normalize_key("first-name"), "firstname");
/// ```
pub fn normalize_key(key: &str) -> String {
    let mut key = key.trim().to_lowercase();
    for prefix in FORM_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            key = rest.to_string();
        }
    }
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .collect()
}

/// Build the normalized lookup table from a JSON profile object.
///
/// Strings are used verbatim, numbers and booleans are rendered as text,
/// `null` entries are ignored. Arrays and objects are rejected.
pub(crate) fn build_mapping(profile: &serde_json::Value) -> Result<HashMap<String, String>> {
    let object = profile.as_object().ok_or_else(|| {
        FilerError::InvalidProfile("profile must be a JSON object of field values".into())
    })?;

    let mut mapping = HashMap::with_capacity(object.len());
    for (key, value) in object {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => continue,
            _ => {
                return Err(FilerError::InvalidProfile(format!(
                    "value for '{key}' must be a string, number or boolean"
                )))
            }
        };
        mapping.insert(normalize_key(key), text);
    }
    Ok(mapping)
}

/// Counts produced by [`FillEngine::apply`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FillCounts {
    pub filled: usize,
    pub skipped: usize,
}

/// Writes profile values into a document's form fields.
pub(crate) struct FillEngine<'a> {
    document: &'a mut Document,
}

impl<'a> FillEngine<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    /// Fill every field whose normalized name is in `mapping`. Fields without
    /// a match, or whose value cannot be applied, count as skipped.
    pub fn apply(
        &mut self,
        fields: &[DiscoveredField],
        mapping: &HashMap<String, String>,
    ) -> Result<FillCounts> {
        let mut counts = FillCounts::default();

        for field in fields {
            let Some(value) = mapping.get(&normalize_key(&field.name)) else {
                counts.skipped += 1;
                continue;
            };
            if self.fill_field(field, value)? {
                counts.filled += 1;
            } else {
                counts.skipped += 1;
            }
        }

        if counts.filled > 0 {
            self.request_appearance_regeneration()?;
        }
        Ok(counts)
    }

    fn fill_field(&mut self, field: &DiscoveredField, value: &str) -> Result<bool> {
        match FieldParser::field_type(field) {
            FieldType::Checkbox => self.fill_checkbox(field, value),
            FieldType::Radio => self.fill_radio(field, value),
            FieldType::Signature => {
                tracing::warn!(field = %field.name, "signature fields cannot be filled from a profile");
                Ok(false)
            }
            FieldType::Unknown if field.field_type.as_deref() == Some(&b"Btn"[..]) => Ok(false),
            _ => {
                self.set(field.id, "V", lopdf::text_string(value))?;
                Ok(true)
            }
        }
    }

    fn fill_checkbox(&mut self, field: &DiscoveredField, value: &str) -> Result<bool> {
        let document: &Document = self.document;
        let on_state = field
            .widgets
            .iter()
            .flat_map(|w| on_states(document, *w))
            .next()
            .unwrap_or_else(|| "Yes".to_string());

        let wanted = value.trim().to_lowercase();
        let checked = TRUTHY.contains(&wanted.as_str()) || wanted == on_state.to_lowercase();
        let state = if checked { on_state } else { "Off".to_string() };

        self.set(field.id, "V", Object::Name(state.clone().into_bytes()))?;
        for widget in &field.widgets {
            self.set(*widget, "AS", Object::Name(state.clone().into_bytes()))?;
        }
        Ok(true)
    }

    fn fill_radio(&mut self, field: &DiscoveredField, value: &str) -> Result<bool> {
        let wanted = value.trim().to_lowercase();
        let document: &Document = self.document;
        let widget_states: Vec<(ObjectId, Vec<String>)> = field
            .widgets
            .iter()
            .map(|w| (*w, on_states(document, *w)))
            .collect();

        let Some(selected) = widget_states
            .iter()
            .flat_map(|(_, states)| states.iter())
            .find(|s| s.to_lowercase() == wanted)
            .cloned()
        else {
            tracing::warn!(field = %field.name, value, "no radio option matches profile value");
            return Ok(false);
        };

        self.set(field.id, "V", Object::Name(selected.clone().into_bytes()))?;
        for (widget, states) in &widget_states {
            let state = if states.contains(&selected) {
                selected.as_str()
            } else {
                "Off"
            };
            self.set(*widget, "AS", Object::Name(state.as_bytes().to_vec()))?;
        }
        Ok(true)
    }

    /// Ask viewers to rebuild field appearances from the new values.
    fn request_appearance_regeneration(&mut self) -> Result<()> {
        let root_id = self.document.trailer.get(b"Root")?.as_reference()?;
        let acroform_ref = self
            .document
            .get_object(root_id)?
            .as_dict()?
            .get(b"AcroForm")?
            .as_reference()
            .ok();

        let acroform = match acroform_ref {
            Some(id) => self.document.get_object_mut(id)?.as_dict_mut()?,
            None => self
                .document
                .get_object_mut(root_id)?
                .as_dict_mut()?
                .get_mut(b"AcroForm")?
                .as_dict_mut()?,
        };
        acroform.set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }

    fn set(&mut self, id: ObjectId, key: &str, value: Object) -> Result<()> {
        self.document
            .get_object_mut(id)?
            .as_dict_mut()?
            .set(key, value);
        Ok(())
    }
}
