//! # sheetstyle-xlsx
//!
//! XLSX (Office Open XML) package reader and writer for sheetstyle.
//!
//! Parts the model does not cover, and unmodelled XML inside the parts it
//! does, are carried through a read and write unchanged.

pub mod error;
pub mod file;
pub mod package;
pub mod reader;
pub mod writer;

mod shared_strings;
mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use file::{OpenOptions, XlsxFile};
pub use package::{ContentTypes, Package, Relationship, Relationships};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
pub use xml::PreservedXml;
