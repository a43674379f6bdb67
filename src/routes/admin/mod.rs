mod logout;
mod subscribers;

pub use logout::*;
pub use subscribers::*;
