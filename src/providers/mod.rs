pub mod memory;
pub mod ollama;
pub mod openai;
pub mod sqlite;
