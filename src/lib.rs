//! Coroutine stacks turns a dump of coroutine states into a tree of the call stacks they share.
//!
//! A coroutine dump, as printed by a debugger, lists every live coroutine with its state and
//! stack trace. With hundreds of coroutines most of those traces end in the same handful of
//! frames (the dispatcher loop, `runBlocking`, the same `suspend` call), which makes the raw
//! dump hard to read. This crate collapses the dump so each shared run of outer frames is
//! printed once, with the states of every coroutine that reached it, and indents wherever the
//! coroutines go their separate ways.
//!
//! Processing happens in two stages: [`dump`] parses the text into [`dump::Coroutine`] records,
//! and [`tree`] builds a prefix tree over their reversed stack traces and renders it. [`batch`]
//! runs both stages over a whole directory of dumps.
//!
//! # Command-line use
//!
//! ```console
//! $ coroutine-stacks dump.txt
//! 3 Coroutines RUNNING, SUSPENDED, SUSPENDED,
//! 	com.example.MainKt.main
//! 	kotlinx.coroutines.BuildersKt.runBlocking
//! 	1 Coroutine RUNNING,
//! 		com.example.Worker.compute
//! 	2 Coroutines SUSPENDED, SUSPENDED,
//! 		kotlinx.coroutines.DelayKt.delay
//! $ coroutine-stacks dumps/ --output-dir outs/
//! ```
//!
//! # Programmatic access
//!
//! ```
//! let dump = "\"coroutine#1\" state: RUNNING\n\tframeA\n\tframeB\n";
//! let coroutines = coroutine_stacks::dump::parse(dump).unwrap();
//! assert_eq!(
//!     coroutine_stacks::tree::render(&coroutines),
//!     "1 Coroutine RUNNING,\n\tframeB\n\tframeA\n"
//! );
//! ```

#![deny(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

#[macro_use]
extern crate log;

/// Rendering every dump in a directory.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
pub mod batch;

/// Parsing coroutine dumps.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
pub mod dump;

/// Grouping coroutines by shared stack suffixes and rendering the result.
///
/// See the [crate-level documentation] for details.
///
///   [crate-level documentation]: ../index.html
pub mod tree;
