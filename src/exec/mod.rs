// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`invoker`] runs one solver command with a deadline and captures its
//!   output.
//! - [`timing`] parses the timing wrapper's report out of stderr.
//! - [`reaper`] kills leftover solver processes after every invocation.
//! - [`process_table`] provides the `ProcessTable` trait and the
//!   `sysinfo`-backed implementation; tests replace it with a fake.

pub mod invoker;
pub mod process_table;
pub mod reaper;
pub mod timing;

pub use invoker::{Completed, InvocationResult, Invoker};
pub use process_table::{ProcessEntry, ProcessTable, SysinfoProcessTable};
pub use reaper::Reaper;
pub use timing::{split_timing, TimingWrapper};
