pub mod app;
pub mod components;
pub mod home;
pub mod state;
pub mod theme;
