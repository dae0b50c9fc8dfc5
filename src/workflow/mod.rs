pub mod chapter_flow;
pub mod progress;
pub mod session;
pub mod term_scanner;

pub use chapter_flow::{ChapterFlow, ChapterOutcome, CREDENTIAL_INVALID_MESSAGE};
pub use progress::ProgressTracker;
pub use session::{SessionHandle, SessionState};
pub use term_scanner::{ScanOutput, TermScanner, TERMS_SEPARATOR};
