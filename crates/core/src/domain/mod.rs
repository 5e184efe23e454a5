pub mod score;
pub mod series;
