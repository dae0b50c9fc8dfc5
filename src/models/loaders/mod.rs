pub mod document_loader;
pub mod glossary_loader;

pub use document_loader::load_document;
pub use glossary_loader::{load_glossary, save_glossary};
