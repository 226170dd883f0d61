pub mod chat;
pub mod directory;
