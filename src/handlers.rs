pub mod movements;
pub mod products;
