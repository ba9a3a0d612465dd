/// Domain layer: registry data model, checkouts and operation results
pub mod entities;
pub mod value_objects;
