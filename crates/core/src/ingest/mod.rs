pub mod history;
pub mod symbols;
