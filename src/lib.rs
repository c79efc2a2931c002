// src/lib.rs

//! quoteharvest library
//!
//! Incrementally harvests a paginated quote listing into a deduplicated
//! CSV corpus and serves filtered, paginated views over it.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
