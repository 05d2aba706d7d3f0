//! kdbxsync Core - Domain logic and the provider lifecycle
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `SourceFile`, `RecordSchema`, `DomainError`
//! - **Persistent store** - `PersistentStore` and the shared `StoreHandle`
//! - **Port definitions** - Traits for adapters: `CloudProvider`, `Console`
//! - **Use cases** - `Syncer`, which drives every registered provider
//!
//! # Architecture
//!
//! The domain module has no I/O. Ports define the trait interfaces that the
//! cloud adapters and the terminal front-end implement. The `Syncer` use case
//! only ever sees `dyn CloudProvider`, never a concrete backend.

pub mod config;
pub mod domain;
pub mod ports;
pub mod store;
pub mod usecases;
