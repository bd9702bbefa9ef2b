pub mod driver;
pub mod page;
