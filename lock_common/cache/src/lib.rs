//! Async Redis client shared by the lock store

pub mod client;
pub mod error;
pub mod operations;

pub use client::RedisClient;
pub use error::RedisError;
