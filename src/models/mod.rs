pub mod chapter;
pub mod glossary;
pub mod loaders;
pub mod notification;

pub use chapter::{Chapter, ChapterStatus, ChapterStatusInfo};
pub use glossary::{merge_terms, DetectedTerm, GlossaryTerm, MergeReport, TermCategory};
pub use loaders::{load_document, load_glossary, save_glossary};
pub use notification::{Notification, NotificationDetails, NotificationType};
