pub mod catalog;
pub mod movement;
pub mod product;
pub mod unit;
