pub mod order;
pub mod render;
