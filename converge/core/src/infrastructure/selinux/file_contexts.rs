// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! File Context Policy
//!
//! Loads the host's path-pattern → label policy from
//! `<root>/<policy>/contexts/files/` and answers default-label queries the way
//! `matchpathcon` does.
//!
//! # Policy files
//!
//! | File | Role |
//! |------|------|
//! | `file_contexts` | distribution policy (required) |
//! | `file_contexts.homedirs` | generated home directory entries |
//! | `file_contexts.local` | local administrator entries |
//! | `file_contexts.subs` | local path aliases |
//! | `file_contexts.subs_dist` | distribution path aliases |
//!
//! # Lookup order
//!
//! Specs without regex metacharacters beat pattern specs; within each group
//! the spec loaded last wins. A spec with a file-type token only matches
//! objects of that type.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::attributes::TYPE_MASK;

const NONE_CONTEXT: &str = "<<none>>";
const META_CHARS: &[char] = &['.', '^', '$', '?', '*', '+', '|', '[', '(', '{', '\\'];

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("File context policy not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// One line of a `file_contexts` file.
#[derive(Debug, Clone)]
struct ContextSpec {
    pattern: String,
    regex: Regex,
    /// Required `st_mode` type bits, `None` for any type.
    file_type: Option<u32>,
    /// `None` for `<<none>>`.
    context: Option<String>,
    exact: bool,
}

impl ContextSpec {
    fn matches(&self, path: &str, file_type: u32) -> bool {
        if let Some(required) = self.file_type {
            if file_type != 0 && file_type != required {
                return false;
            }
        }
        if self.exact {
            self.pattern == path
        } else {
            self.regex.is_match(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Substitution {
    alias: String,
    real: String,
}

/// Parsed file context policy.
#[derive(Debug, Clone, Default)]
pub struct FileContexts {
    specs: Vec<ContextSpec>,
    local_subs: Vec<Substitution>,
    dist_subs: Vec<Substitution>,
}

impl FileContexts {
    /// Load every policy file under `files_dir`.
    pub fn load(files_dir: &Path) -> Result<Self, PolicyError> {
        let base = files_dir.join("file_contexts");
        let base_text = match read_optional(&base)? {
            Some(text) => text,
            None => return Err(PolicyError::NotFound(base)),
        };

        let mut contexts = Self::default();
        contexts.add_specs(&base_text, &base.display().to_string());

        for name in ["file_contexts.homedirs", "file_contexts.local"] {
            let path = files_dir.join(name);
            if let Some(text) = read_optional(&path)? {
                contexts.add_specs(&text, &path.display().to_string());
            }
        }

        if let Some(text) = read_optional(&files_dir.join("file_contexts.subs"))? {
            contexts.local_subs = parse_substitutions(&text);
        }
        if let Some(text) = read_optional(&files_dir.join("file_contexts.subs_dist"))? {
            contexts.dist_subs = parse_substitutions(&text);
        }

        tracing::debug!(
            dir = %files_dir.display(),
            specs = contexts.specs.len(),
            substitutions = contexts.local_subs.len() + contexts.dist_subs.len(),
            "Loaded file context policy"
        );

        Ok(contexts)
    }

    /// Parse a single `file_contexts` text.
    pub fn parse(text: &str) -> Self {
        let mut contexts = Self::default();
        contexts.add_specs(text, "<inline>");
        contexts
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Default label for `path` given its `st_mode`.
    ///
    /// `None` when no spec matches or the winning spec is `<<none>>`.
    pub fn lookup(&self, path: &str, mode: u32) -> Option<String> {
        let path = self.substitute(path);
        let file_type = mode & TYPE_MASK;

        let winner = self
            .specs
            .iter()
            .rev()
            .filter(|spec| spec.exact)
            .chain(self.specs.iter().rev().filter(|spec| !spec.exact))
            .find(|spec| spec.matches(&path, file_type))?;

        tracing::trace!(path = %path, pattern = %winner.pattern, "Matched file context spec");
        winner.context.clone()
    }

    fn add_specs(&mut self, text: &str, origin: &str) {
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_spec(line) {
                Ok(spec) => self.specs.push(spec),
                Err(reason) => {
                    tracing::warn!(
                        origin = %origin,
                        line = index + 1,
                        reason = %reason,
                        "Skipping invalid file context entry"
                    );
                }
            }
        }
    }

    /// Apply local aliases, then distribution aliases to the result.
    fn substitute(&self, path: &str) -> String {
        let path = apply_substitution(&self.local_subs, path).unwrap_or_else(|| path.to_string());
        apply_substitution(&self.dist_subs, &path).unwrap_or(path)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, PolicyError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PolicyError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn parse_spec(line: &str) -> Result<ContextSpec, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let (pattern, type_token, context) = match fields.as_slice() {
        [pattern, context] => (*pattern, None, *context),
        [pattern, type_token, context] => (*pattern, Some(*type_token), *context),
        _ => return Err(format!("expected 2 or 3 fields, found {}", fields.len())),
    };

    let file_type = type_token.map(parse_file_type).transpose()?;
    let regex = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| format!("invalid pattern {:?}: {}", pattern, e))?;
    let context = if context == NONE_CONTEXT {
        None
    } else {
        Some(context.to_string())
    };

    Ok(ContextSpec {
        pattern: pattern.to_string(),
        regex,
        file_type,
        context,
        exact: !pattern.contains(META_CHARS),
    })
}

fn parse_file_type(token: &str) -> Result<u32, String> {
    match token {
        "--" => Ok(0o100000),
        "-d" => Ok(0o040000),
        "-l" => Ok(0o120000),
        "-c" => Ok(0o020000),
        "-b" => Ok(0o060000),
        "-s" => Ok(0o140000),
        "-p" => Ok(0o010000),
        other => Err(format!("unknown file type token {:?}", other)),
    }
}

fn parse_substitutions(text: &str) -> Vec<Substitution> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let alias = fields.next()?.trim_end_matches('/');
            let real = fields.next()?.trim_end_matches('/');
            if alias.is_empty() {
                return None;
            }
            Some(Substitution {
                alias: alias.to_string(),
                real: real.to_string(),
            })
        })
        .collect()
}

fn apply_substitution(subs: &[Substitution], path: &str) -> Option<String> {
    subs.iter().find_map(|sub| {
        let rest = path.strip_prefix(sub.alias.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(format!("{}{}", sub.real, rest))
        } else {
            None
        }
    })
}
