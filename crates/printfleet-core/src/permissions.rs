// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Permission checks consumed by the queue view model.
//
// Enforcement happens on the server. The client only uses these answers to
// hide or disable actions the current user cannot perform.

/// Coarse permissions granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    QueueRead,
    QueueCreate,
    QueueReorder,
    /// Start or stop prints on a physical printer.
    PrintersControl,
}

/// Resource-level actions that may be limited to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Update,
    Delete,
}

/// Answers "may the current user do X".
pub trait PermissionGate: Send + Sync {
    fn has_permission(&self, permission: Permission) -> bool;

    /// Whether the user may perform `action` on a `resource` created by
    /// `owner_id` (`None` when the creator is unknown).
    fn can_modify(&self, resource: &str, action: Action, owner_id: Option<i64>) -> bool;
}

/// Gate used when authentication is disabled on the backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn has_permission(&self, _permission: Permission) -> bool {
        true
    }

    fn can_modify(&self, _resource: &str, _action: Action, _owner_id: Option<i64>) -> bool {
        true
    }
}
