pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::block::{BlockRecord, BlockRole, UserId, UserTotals};
pub use domain::elapsed::ElapsedTime;
pub use errors::{ApplicationError, DomainError};
