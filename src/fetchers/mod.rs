pub mod base;
pub mod infoway;
