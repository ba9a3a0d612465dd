//! Application layer: dependency resolution, work queues and the use cases
//! driven by the CLI.

pub mod services;
pub mod use_cases;
