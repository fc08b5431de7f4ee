pub mod channel;
pub mod error;

#[cfg(feature = "native")]
pub mod matchbox;
