//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that enforce the
//! area-allocation invariant run inside a transaction holding a
//! `SELECT … FOR UPDATE` lock on the owning farmer row and return
//! [`crate::DbError`]; plain CRUD returns `sqlx::Error`.

pub mod cooperative_repo;
pub mod farmer_repo;
pub mod project_repo;
pub mod user_repo;

pub use cooperative_repo::CooperativeRepo;
pub use farmer_repo::FarmerRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
