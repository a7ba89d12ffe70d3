pub mod candidate;
pub mod session;
pub mod user;
pub mod vote;
