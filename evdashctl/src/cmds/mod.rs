pub use dashboard::*;
pub use resolve::*;
pub use vehicles::*;

mod dashboard;
mod resolve;
mod vehicles;
