// Shared fixtures: small PDFs synthesized with lopdf so the tests need no
// binary files in the repository.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::path::{Path, PathBuf};

/// Names of the fields in [`form_pdf`], in document order.
pub const FORM_FIELDS: [&str; 5] = ["first_name", "ssn", "agree", "plan", "home.city"];

fn rect() -> Object {
    Object::Array(vec![100.into(), 700.into(), 300.into(), 720.into()])
}

/// One page plus an AcroForm holding:
///
/// - `first_name`: empty text field
/// - `ssn`: required text field with a value
/// - `agree`: checkbox with `Yes`/`Off` appearances, currently off
/// - `plan`: combo box with options `Basic` and `Premium`, set to `Basic`
/// - `home.city`: text field under a non-terminal parent that supplies
///   its `/FT`
pub fn form_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let first_name = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("first_name"),
        "Rect" => rect(),
    });
    let ssn = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("ssn"),
        "Ff" => 2,
        "V" => Object::string_literal("123-45-6789"),
        "Rect" => rect(),
    });

    let yes_id = doc.add_object(Stream::new(dictionary! {}, b"0 g".to_vec()));
    let off_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let agree = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal("agree"),
        "V" => "Off",
        "AS" => "Off",
        "AP" => dictionary! {
            "N" => dictionary! { "Yes" => yes_id, "Off" => off_id },
        },
        "Rect" => rect(),
    });

    let plan = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Ch",
        "T" => Object::string_literal("plan"),
        "Ff" => 1 << 17,
        "Opt" => vec![
            Object::string_literal("Basic"),
            Object::Array(vec![Object::string_literal("P"), Object::string_literal("Premium")]),
        ],
        "V" => Object::string_literal("Basic"),
        "Rect" => rect(),
    });

    let home = doc.new_object_id();
    let city = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "T" => Object::string_literal("city"),
        "Parent" => home,
        "Rect" => rect(),
    });
    doc.objects.insert(
        home,
        Object::Dictionary(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("home"),
            "Kids" => vec![city.into()],
        }),
    );

    let widgets: Vec<Object> = [first_name, ssn, agree, plan, city]
        .iter()
        .map(|id| (*id).into())
        .collect();
    let acroform = doc.add_object(dictionary! {
        "Fields" => vec![first_name.into(), ssn.into(), agree.into(), plan.into(), home.into()],
    });

    finish(doc, Some(widgets), Some(acroform))
}

/// One text field whose name is a UTF-8 text string with a byte-order mark
/// and whose value uses PDFDocEncoding bytes outside Latin-1.
pub fn encoded_form_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("2.0");

    let mut name = b"\xEF\xBB\xBF".to_vec();
    name.extend_from_slice("Ärztliche Versicherung".as_bytes());
    let insurer = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::String(name, StringFormat::Literal),
        "V" => Object::String(b"Acme\x92 plan \x84 tax".to_vec(), StringFormat::Literal),
        "Rect" => rect(),
    });
    let acroform = doc.add_object(dictionary! {
        "Fields" => vec![insurer.into()],
    });

    finish(doc, Some(vec![insurer.into()]), Some(acroform))
}

/// A single blank page and no form.
pub fn plain_pdf() -> Vec<u8> {
    finish(Document::with_version("1.7"), None, None)
}

fn finish(mut doc: Document, annots: Option<Vec<Object>>, acroform: Option<lopdf::ObjectId>) -> Vec<u8> {
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let mut page = dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
    };
    if let Some(annots) = annots {
        page.set("Annots", annots);
    }
    let page_id = doc.add_object(page);

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });
    if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
        page.set("Parent", pages_id);
    }

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(acroform) = acroform {
        catalog.set("AcroForm", acroform);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
