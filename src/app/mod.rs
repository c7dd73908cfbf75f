//! 应用层

pub mod console;
pub mod product;
