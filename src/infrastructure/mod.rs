pub mod paper_source;

pub use paper_source::{HttpPaperSource, PaperSource, RawResponse};
