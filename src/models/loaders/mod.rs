pub mod toml_loader;

pub use toml_loader::{load_download_form, load_download_request};
