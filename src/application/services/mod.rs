pub mod batch_queue;
pub mod dependency_resolver;
pub mod fan_out;

pub use batch_queue::BatchQueue;
pub use dependency_resolver::{DependencyResolver, Resolution, ResolveError, ResolveErrorKind};
pub use fan_out::run_across;
