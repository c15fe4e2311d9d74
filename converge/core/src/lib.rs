// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! fsconverge core
//!
//! Converges files, directories and templated files to a declared state:
//! owner, group, mode, content checksum and SELinux security label.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Inspection, diff and ordered application of attribute changes

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
