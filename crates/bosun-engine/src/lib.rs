//! Bosun Workflow Engine
//!
//! This crate provides workflow orchestration for multi-stage server
//! provisioning. It walks a definition's transition graph for each
//! execution, dispatching invoke steps synchronously, suspending on
//! callback-wait steps until an external completion signal or a timeout,
//! and routing failures onto catch edges.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Orchestrator                         │
//! │  ┌──────────────────────────────────────────────┐    │
//! │  │            ExecutionStore                    │    │
//! │  │   definitions + execution records            │    │
//! │  └──────────────────────────────────────────────┘    │
//! │                      │                                │
//! │                      ▼                                │
//! │  ┌──────────────────────────────────────────────┐    │
//! │  │           CallbackRegistry                   │    │
//! │  │   token → suspended execution, consumed once │    │
//! │  └──────────────────────────────────────────────┘    │
//! │                      │                                │
//! │                      ▼                                │
//! │  ┌──────────────────────────────────────────────┐    │
//! │  │         ExecutionEvent stream                │    │
//! │  │   Started | Suspended | Resumed | Completed  │    │
//! │  └──────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bosun_engine::{MemoryExecutionStore, Orchestrator};
//! use std::sync::Arc;
//!
//! let orchestrator = Arc::new(Orchestrator::new(executors, Arc::new(MemoryExecutionStore::new())));
//! orchestrator.register_definition(definition).await?;
//!
//! let id = orchestrator.start("provision-server", payload).await?;
//! let finished = orchestrator.wait(id).await?;
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod store;

pub use config::*;
pub use error::*;
pub use orchestrator::*;
pub use registry::*;
pub use store::*;
