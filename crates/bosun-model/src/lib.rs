//! Bosun Workflow Model
//!
//! This crate provides the data model for the Bosun provisioning
//! orchestrator: workflow definitions and their transition graphs,
//! execution records, payloads, and callback tokens.
//!
//! # Resources
//!
//! - `WorkflowDefinition` - a validated, immutable transition graph of steps
//! - `Step` - one node in the graph, either `Invoke` or `CallbackWait`
//! - `StageChain` - a generated linear sequence of callback-wait steps
//! - `Execution` - the state of one run of a definition
//!
//! Definitions are built once through [`DefinitionBuilder`], validated
//! (duplicate ids, dangling edges, cycles) before any execution may
//! reference them, and never mutated afterwards.

pub mod builder;
pub mod chain;
pub mod definition;
pub mod error;
pub mod execution;
pub mod payload;
pub mod step;

pub use builder::*;
pub use chain::*;
pub use definition::*;
pub use error::*;
pub use execution::*;
pub use payload::*;
pub use step::*;
