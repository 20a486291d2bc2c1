pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod unit_repo;
pub use unit_repo::UnitRepository;
pub mod movement_repo;
pub use movement_repo::MovementRepository;

pub mod store;
pub use store::{IdentityResolver, InventoryStore, InventoryTx};
pub mod pg_store;
pub use pg_store::PgInventoryStore;

#[cfg(test)]
pub mod memory_store;
