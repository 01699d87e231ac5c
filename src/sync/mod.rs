//! Client-side synchronization of remote entity collections.
//!
//! A [`services::SyncStore`] owns the cache of one collection for the bound
//! user. It loads the collection from a [`ports::RemoteTable`], applies the
//! rows returned by its own mutations and merges the push notifications the
//! remote delivers for the same rows, converging to exactly one entry per
//! id whatever order those arrive in.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Shared adapter building blocks in [`adapters`]
//! - The cache and store in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
