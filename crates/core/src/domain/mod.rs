pub mod block;
pub mod elapsed;
