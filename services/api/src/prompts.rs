//! Prompt templates loaded from disk.
//!
//! Every `*.md` file in the prompts directory becomes a template keyed by its
//! file stem. The interviewer prompt lives in `interviewer.md`.

use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};
use tracing::warn;

pub const INTERVIEWER_PROMPT: &str = "interviewer";

/// Loads all markdown prompts from a directory.
///
/// A missing directory is not an error; the built-in templates are used instead.
pub fn load_prompts(prompts_path: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    if !prompts_path.is_dir() {
        warn!(path = %prompts_path.display(), "Prompts directory not found; using built-in prompts");
        return Ok(prompts);
    }

    for entry in fs::read_dir(prompts_path)
        .with_context(|| format!("Failed to read prompts directory {}", prompts_path.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt {}", path.display()))?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}
