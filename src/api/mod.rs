pub mod properties;
pub mod search;
