// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowdraft: the headless core of a flowchart and ER diagram editor.
//!
//! The [`model`] holds nodes and edges, [`ops`] is the only way to change it, and
//! [`session::EditorSession`] layers selection, edit dialogs, auto-save ([`store`]) and AI
//! generation ([`generate`]) on top. [`server`] is a mock backend for local development.

pub mod config;
pub mod generate;
pub mod layout;
pub mod model;
pub mod ops;
pub mod server;
pub mod session;
pub mod store;
