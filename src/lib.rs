//! A teaching-grade relational storage stack.
//!
//! The crate is built around two pieces: a fixed-size [`buffer`] pool with
//! clock-sweep replacement caching the pages of on-disk [`storage`] heap
//! files, and the [`executor`] join operators that drive it under realistic
//! access patterns. The [`catalog`], [`sql`] mini-parser, and [`heap`]
//! tuple access are the thin glue connecting them.

pub mod buffer;
pub mod catalog;
pub mod executor;
pub mod heap;
pub mod sql;
pub mod storage;
