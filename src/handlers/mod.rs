pub mod bank;
pub mod render;

pub use bank::BankHandler;
pub use render::{RenderHandler, RenderOutcome, Rendered};
