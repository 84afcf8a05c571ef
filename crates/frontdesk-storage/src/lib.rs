// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Frontdesk support-chat core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! modules for conversations, messages, the wait queue, the audit trail,
//! ratings, and the FAQ knowledge base.
//!
//! The single-writer model is load-bearing: the atomic check-then-act
//! transitions (claim, close, enqueue) rely on every write going through
//! one background connection.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
