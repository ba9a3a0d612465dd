pub mod display;

pub use display::{DisplayHelper, StatusType};
