// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per stored entity.

pub mod escalations;
pub mod messages;
pub mod notifications;
pub mod sessions;
