mod health_check;
mod recipients;
mod send;

pub use health_check::*;
pub use recipients::*;
pub use send::*;
