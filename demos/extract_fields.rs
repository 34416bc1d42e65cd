//! Print every form field of a PDF.
//!
//! Usage:
//!   cargo run --example extract_fields -- claim_form.pdf

use formfile::PdfForm;
use std::{env, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_file>", args[0]);
        process::exit(1);
    }

    let form = PdfForm::from_path(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error loading PDF: {e}");
        process::exit(1);
    });

    let result = form.extract_fields();
    println!("{}: {} field(s)", result.filename, result.total_fields);

    for field in &result.fields {
        let required = if field.required { " *" } else { "" };
        print!("  [p{}] {}{} ({})", field.page, field.name, required, field.field_type);
        if let Some(value) = &field.value {
            print!(" = {value:?}");
        }
        if !field.options.is_empty() {
            print!(" options: {}", field.options.join(" | "));
        }
        println!();
    }

    let flagged = formfile::sensitive::detect_sensitive(&result.fields);
    if !flagged.is_empty() {
        println!("Sensitive: {}", flagged.join(", "));
    }
}
