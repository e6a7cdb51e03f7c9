//! Distributed lock module, providing a distributed lock implementation based on Redis
//!
//! A lock is a key holding a unique ownership token with an expiration. Acquiring is one
//! atomic set-if-absent; releasing is one atomic compare-and-delete, so a holder whose
//! lock expired and was taken over can never remove the new holder's record.
//!
//! ```no_run
//! use std::time::Duration;
//! use distributed_lock::{LockConfig, LockManager};
//!
//! # async fn run() -> distributed_lock::Result<()> {
//! let manager = LockManager::from_config(&LockConfig::from_env()?).await?;
//! match manager.try_acquire("report-job", Duration::from_secs(30)).await {
//!     Ok(mut lock) => {
//!         // critical section
//!         lock.release().await?;
//!     }
//!     Err(e) if e.is_contended() => log::info!("report-job is running elsewhere"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod lock;
pub mod manager;
pub mod memory;
pub mod retry;
pub mod scripts;
pub mod store;
pub mod token;

pub use client::RedisLockStore;
pub use config::LockConfig;
pub use error::{DistributedLockError, NotHeldReason, Result, StoreError};
pub use lock::Lock;
pub use manager::LockManager;
pub use memory::MemoryLockStore;
pub use retry::{acquire_with_retry, RetryPolicy};
pub use store::{LockStore, ReleaseOutcome};
pub use token::{TokenGenerator, UuidTokenGenerator};
