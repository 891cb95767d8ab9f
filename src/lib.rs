// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # docmeta
//!
//! Document metadata extraction: pull the text out of a PDF, DOCX, image or
//! plain-text file and derive descriptive metadata from it.
//!
//! ## Architecture
//!
//! - **Extractors** (`extract`): one per format. PDFs go through a three-tier
//!   fallback (native text layer, then `lopdf`, then OCR)
//! - **OCR** (`ocr`): tesseract and pdftoppm, probed once per process
//! - **Heuristics** (`analysis`): keyword ranking, positional summary and
//!   keyword-bucket classification
//! - **Assembler** (`metadata`): file attributes plus derived fields in one record
//! - **Uploads** (`upload`): allowlist, sanitising and temporary staging
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//!
//! use docmeta::config::DocmetaConfig;
//! use docmeta::metadata::generate_metadata;
//!
//! let config = DocmetaConfig::default();
//! let ocr = docmeta::ocr::install_global(&config.ocr);
//! let report = generate_metadata(Path::new("contract.pdf"), &config, ocr);
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod metadata;
pub mod ocr;
pub mod upload;
