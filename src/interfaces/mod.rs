pub mod directory;
pub mod providers;
pub mod store;
