//! Buffer pool: a fixed-size in-memory cache of disk pages.
//!
//! The pool mediates every cached page access with an explicit pin/unpin
//! lifecycle and evicts with a clock-sweep second-chance policy. See
//! [`BufMgr`] for the contract.

mod error;
mod frame;
mod frame_table;
mod pool;

pub use error::BufferError;
pub use frame::FrameId;
pub use pool::BufMgr;
