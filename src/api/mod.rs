mod pages;
mod types;

pub use types::*;

pub mod axum;
