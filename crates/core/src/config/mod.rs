//! `grvlfinder.toml`: where it is found and what it holds

mod loader;
mod schema;

pub use loader::{default_path, Config};
pub use schema::*;
