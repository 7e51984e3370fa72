//! Job/Progress Coordinator (C10, §6): owns a job's persisted lifecycle
//! plus a fan-out progress channel other consumers can subscribe to.

pub mod coordinator;

pub use coordinator::JobCoordinator;
