// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification fanout contract.

use crate::events::{Notification, NotifyScope};

/// Fire-and-forget broadcast of lifecycle and message events.
///
/// No delivery guarantee, no backpressure, no retry: a scope with no
/// current subscriber simply drops the event. `publish` is infallible by
/// design so it can never fail or block a caller's committed transition.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, scope: NotifyScope, event: Notification);
}
