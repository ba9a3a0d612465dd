pub mod clone_url;

pub use clone_url::{CloneUrl, CloneUrlError};
