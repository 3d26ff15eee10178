pub mod chat;
pub mod generate;
pub mod palette;

pub use chat::*;
pub use generate::*;
pub use palette::*;
