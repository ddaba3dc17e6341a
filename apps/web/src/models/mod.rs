pub mod backend;
pub mod resume;
pub mod score;
