pub mod help;
pub mod layout;
pub mod render;
pub mod theme;
pub mod toolbar;
