pub mod chat_factory;
