pub mod segments;
pub mod stream;

#[cfg(feature = "runtime")]
pub mod runtime;
