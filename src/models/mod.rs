pub mod generate;
pub mod session;

pub use generate::*;
pub use session::*;
