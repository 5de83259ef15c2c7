pub mod camera;
pub mod context;
pub mod draw;
pub mod light;
pub mod loader;
pub mod manager;
pub mod material;
pub mod mesh;
pub mod props;
pub mod shapes;
pub mod texture;
