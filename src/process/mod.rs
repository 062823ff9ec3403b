//! Process control subsystem.
//!
//! # Data Flow
//! ```text
//! Rendered config
//!     → gate.rs (one lock around write + reload)
//!     → writer.rs (temp file, fsync, size check, rename)
//!     → supervisor.rs (daemon reload signal)
//!
//! Certificate tooling
//!     → command.rs (spawn, capture combined output, optional timeout)
//! ```
//!
//! # Design Decisions
//! - Every non-zero exit becomes a CommandError carrying the output
//! - A failed write never reaches the reload step
//! - Subprocesses are killed when their future is dropped (timeout)

pub mod command;
pub mod gate;
pub mod supervisor;
pub mod writer;

pub use command::{run_command, run_inherited, CommandCause, CommandError, CommandLine};
pub use gate::{ApplyError, ConfigGate};
pub use supervisor::{NginxSupervisor, ProxySupervisor};
pub use writer::{write_config, WriteError};
