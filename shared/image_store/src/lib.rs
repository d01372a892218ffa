//! Quota-and-lifecycle-managed image object store
//!
//! This crate owns the storage rules of the service: how many bytes/objects an
//! owner may hold, how the bounded anonymous pool evicts its oldest entries,
//! how derived (resized) variants replace or accompany originals, and how
//! time-based expiry is enforced lazily on access. The HTTP layer in the
//! `backend` crate is thin glue over [`lifecycle::ImageLifecycle`].

pub mod anon_pool;
pub mod config;
pub mod expiry;
pub mod lifecycle;
pub mod quota;
pub mod record;
pub mod resize;
pub mod store;
