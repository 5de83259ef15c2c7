pub mod app;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod scene;
