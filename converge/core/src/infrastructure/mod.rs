// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod host_fs;
pub mod selinux;
pub mod template_engine;

pub use host_fs::LocalHostFilesystem;
pub use selinux::SelinuxResolver;
pub use template_engine::HandlebarsRenderer;
