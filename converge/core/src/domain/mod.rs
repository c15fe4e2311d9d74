// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Value objects, desired/current state, and the seams to the host
//! (`HostFilesystem`, `SecurityContextResolver`, `TemplateRenderer`).
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types and decisions, no direct host access

pub mod attributes;
pub mod checksum;
pub mod config;
pub mod host;
pub mod label_policy;
pub mod path;
pub mod resource;
pub mod security_label;
pub mod template;
