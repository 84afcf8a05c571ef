// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod audit;
pub mod conversations;
pub mod faq;
pub mod messages;
pub mod queue;
pub mod ratings;
