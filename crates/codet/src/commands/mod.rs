pub mod parse;
pub mod render;
pub mod source;
