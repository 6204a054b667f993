// Subscription entity, period parsing and input validation

pub mod period;
pub mod subscription;
pub mod validation;

pub use period::*;
pub use subscription::*;
pub use validation::*;
