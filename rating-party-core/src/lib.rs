//! The capability layer and rating aggregation of rating party.
//!
//! Nothing in here performs I/O. Tokens are issued and validated by
//! [TokenService], admitted to routes by [Gate], and ratings are ranked by
//! [compute_leaderboard].

mod aggregation;
mod config;
mod gate;
mod token;

pub use aggregation::*;
pub use config::*;
pub use gate::*;
pub use token::*;
