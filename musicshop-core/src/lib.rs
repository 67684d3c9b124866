pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod product;
pub mod promise;
pub mod util;
