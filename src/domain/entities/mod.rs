pub mod library;
pub mod operation;
pub mod repository;

pub use library::{Collection, LibraryDescriptor, Registry, REGISTRY_API_VERSION};
pub use operation::{Operation, OperationError, OperationKind, OperationOutcome, OperationResult};
pub use repository::{RepositoryRecord, VersionFile};
