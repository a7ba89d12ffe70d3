pub mod auth;
pub mod candidate;
pub mod shared;
pub mod vote;
