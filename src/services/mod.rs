pub mod archive;
pub mod cover_page;
pub mod naming;
pub mod pdf_merger;
pub mod run_log;

pub use archive::build_archive;
pub use cover_page::{subject_display, CoverBackground, CoverPageGenerator, CoverText};
pub use naming::{archive_name, derive_name, entry_name, PaperNaming};
pub use pdf_merger::{merge_documents, page_count};
pub use run_log::{JsonRunLog, RunLog, RunLogEntry, RunLogSink};
