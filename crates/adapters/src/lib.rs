// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the external I/O cascadekb's engine depends on: the
//! Process Supervisor, the Log Stream Multiplexer, the Output Parser, and
//! environment plumbing shared by all three.

pub mod env;
pub mod log_mux;
pub mod output_parser;
pub mod supervisor;

pub use log_mux::{LogStream, LogSubscriber};
pub use output_parser::{extract_output_text, parse_log_file, parse_output, ParsedOutput};
pub use supervisor::{spawn_detached, SpawnRequest};
