//! Local record persistence keyed by (collection, id).

pub mod model;
pub mod repository;

pub use model::RecordRowDB;
pub use repository::RecordRepository;
