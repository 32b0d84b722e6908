pub mod app;
pub mod curve;
pub mod theme;
pub mod window;
