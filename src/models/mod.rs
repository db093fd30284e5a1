pub mod loaders;
pub mod paper;
pub mod request;
pub mod subject;

pub use loaders::{load_download_form, load_download_request};
pub use paper::{FetchResult, FetchTask, GroupKey, PaperType, Session};
pub use request::{normalize_paper_numbers, DownloadForm, DownloadRequest};
pub use subject::{Level, SubjectInfo};
