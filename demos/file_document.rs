//! File a PDF into a local GTD tree and print where everything went.
//!
//! Usage:
//!   cargo run --example file_document -- claim_form.pdf ./filed
//!   cargo run --example file_document -- claim_form.pdf ./filed "Blue Cross"

use formfile::{extract_fields, FilingRequest, GtdFiler, LocalBackend, StorageBackend};
use std::{env, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <pdf_file> <root_dir> [source]", args[0]);
        process::exit(1);
    }

    let fields = extract_fields(&args[1]).map(|r| r.fields).unwrap_or_default();
    let request = FilingRequest {
        source: args.get(3).cloned(),
        fields,
        ..FilingRequest::new(&args[1])
    };

    let backends: Vec<Box<dyn StorageBackend>> = vec![Box::new(LocalBackend::new(&args[2]))];
    let filer = GtdFiler::new(backends);

    match filer.file(&request) {
        Ok(result) => {
            println!("Category: {}", result.category);
            println!("Stored:   {}", result.path);
            println!("Metadata: {}", result.metadata_path);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
