pub mod directory;
pub mod index;
