//! Streaming correlators that consume click histories from [`crate::buffers`].

pub mod g2;
