// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the conversation engine and its collaborators.
//!
//! The engine receives both of these as explicit constructor dependencies
//! so it never reaches for ambient/global state and can be driven by fakes
//! in tests.

pub mod provider;
pub mod publisher;

pub use provider::{AssistantProvider, AssistantRequest, AssistantTurn};
pub use publisher::EventPublisher;
