pub mod turn;
pub mod views;

pub use turn::*;
pub use views::*;
