//! Bookkeeping over finished items

pub mod confusion;
pub mod gray_pool;

pub use confusion::{ConfusionMatrix, MetricsReport};
pub use gray_pool::{GrayPool, GrayPoolEntry, GrayReason};
