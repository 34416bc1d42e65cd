use crate::pdf_utils;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;

/// A terminal form field found in the AcroForm tree, with the attributes it
/// inherits from its ancestors already resolved.
#[derive(Debug, Clone)]
pub(crate) struct DiscoveredField {
    pub id: ObjectId,
    /// Fully-qualified name: partial names joined with `.`.
    pub name: String,
    /// Raw `/FT` name (`Tx`, `Btn`, `Ch`, `Sig`), inherited when absent.
    pub field_type: Option<Vec<u8>>,
    /// `/Ff` flags, inherited when absent.
    pub flags: i64,
    /// `/V`, inherited when absent.
    pub value: Option<Object>,
    /// Widget annotations for this field. For a merged field/widget this is
    /// the field itself.
    pub widgets: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    name: String,
    field_type: Option<Vec<u8>>,
    flags: Option<i64>,
    value: Option<Object>,
}

/// Walks a document's `/AcroForm /Fields` tree.
///
/// Non-terminal nodes (whose `/Kids` carry their own `/T`) are descended
/// into; every other node is reported as a terminal field. Field entries
/// must be indirect references; inline dictionaries cannot be written back
/// and are skipped.
pub(crate) struct FieldDiscovery<'a> {
    document: &'a Document,
}

impl<'a> FieldDiscovery<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Return the document's AcroForm dictionary, if it has one.
    pub fn acroform(&self) -> Option<&'a Dictionary> {
        let catalog = self.document.catalog().ok()?;
        let value = catalog.get(b"AcroForm").ok()?;
        pdf_utils::resolve_dict(self.document, value)
    }

    /// Collect every terminal field in document order.
    pub fn collect_fields(&self) -> Vec<DiscoveredField> {
        let Some(acroform) = self.acroform() else {
            return Vec::new();
        };
        let Some(roots) = acroform
            .get(b"Fields")
            .ok()
            .and_then(|v| pdf_utils::resolve_array(self.document, v))
        else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut visited = BTreeSet::new();
        for root in roots {
            match root.as_reference() {
                Ok(id) => self.walk(id, &Inherited::default(), &mut visited, &mut out),
                Err(_) => tracing::warn!("skipping inline AcroForm field entry"),
            }
        }
        out
    }

    fn walk(
        &self,
        id: ObjectId,
        parent: &Inherited,
        visited: &mut BTreeSet<ObjectId>,
        out: &mut Vec<DiscoveredField>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(dict) = self
            .document
            .get_object(id)
            .ok()
            .and_then(|o| o.as_dict().ok())
        else {
            return;
        };

        let inherited = self.inherit(dict, parent);
        let kids = self.kid_ids(dict);
        let child_fields: Vec<ObjectId> = kids
            .iter()
            .copied()
            .filter(|kid| self.has_partial_name(*kid))
            .collect();

        if child_fields.is_empty() {
            let widgets = if kids.is_empty() { vec![id] } else { kids };
            out.push(DiscoveredField {
                id,
                name: inherited.name,
                field_type: inherited.field_type,
                flags: inherited.flags.unwrap_or(0),
                value: inherited.value,
                widgets,
            });
            return;
        }

        for kid in child_fields {
            self.walk(kid, &inherited, visited, out);
        }
    }

    /// Merge this node's inheritable attributes over its parent's.
    fn inherit(&self, dict: &Dictionary, parent: &Inherited) -> Inherited {
        let name = match pdf_utils::extract_string_from_dict(dict, b"T") {
            Some(partial) if parent.name.is_empty() => partial,
            Some(partial) => format!("{}.{}", parent.name, partial),
            None => parent.name.clone(),
        };

        let field_type = dict
            .get(b"FT")
            .ok()
            .and_then(|v| v.as_name().ok())
            .map(|n| n.to_vec())
            .or_else(|| parent.field_type.clone());

        let flags = dict
            .get(b"Ff")
            .ok()
            .and_then(|v| v.as_i64().ok())
            .or(parent.flags);

        let value = dict.get(b"V").ok().cloned().or_else(|| parent.value.clone());

        Inherited {
            name,
            field_type,
            flags,
            value,
        }
    }

    fn kid_ids(&self, dict: &Dictionary) -> Vec<ObjectId> {
        dict.get(b"Kids")
            .ok()
            .and_then(|v| pdf_utils::resolve_array(self.document, v))
            .map(|kids| kids.iter().filter_map(|k| k.as_reference().ok()).collect())
            .unwrap_or_default()
    }

    fn has_partial_name(&self, id: ObjectId) -> bool {
        self.document
            .get_object(id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .map(|d| d.has(b"T"))
            .unwrap_or(false)
    }
}
