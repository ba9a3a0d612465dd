pub mod error;
pub mod result;

pub use error::LibwsError;
pub use result::LibwsResult;
