pub mod farm;
pub mod recommendation;
pub mod weather;

pub use farm::*;
pub use recommendation::*;
pub use weather::*;
