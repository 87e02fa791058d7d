pub mod connection;
pub mod errors;
pub mod models;
pub mod packet;
pub mod settings;
