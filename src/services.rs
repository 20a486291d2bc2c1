pub mod movement_ledger;
pub use movement_ledger::MovementLedger;
pub mod movement_validator;
pub mod naming;
pub mod product_service;
pub use product_service::ProductService;
pub mod unit_registry;
pub use unit_registry::UnitRegistry;
pub mod variant_generator;
