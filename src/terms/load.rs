use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::{Category, Term, TermSet};

#[derive(Clone, Debug, Deserialize)]
struct RawGroupedTerm {
    text: String,
    #[serde(default, alias = "value")]
    weight: f32,
}

pub fn load_term_set(path: &Path) -> Result<TermSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read term file {}", path.display()))?;
    parse_term_set(&raw).with_context(|| format!("failed to parse term file {}", path.display()))
}

/// Accepts either a flat array of terms or an object keyed by category name.
pub fn parse_term_set(raw: &str) -> Result<TermSet> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in term file")?;
    let mut set = TermSet::default();

    match parsed {
        Value::Array(entries) => {
            for (index, entry) in entries.into_iter().enumerate() {
                match Term::deserialize(&entry) {
                    Ok(term) => set.push(term),
                    Err(error) => {
                        tracing::warn!(index, %error, "skipping malformed term entry");
                    }
                }
            }
        }
        Value::Object(groups) => {
            for (key, value) in groups {
                let Some(category) = parse_category(&key) else {
                    tracing::warn!(key = key.as_str(), "skipping unknown category group");
                    continue;
                };
                let entries = value
                    .as_array()
                    .ok_or_else(|| anyhow!("category group {key:?} is not an array"))?;
                for (index, entry) in entries.iter().enumerate() {
                    match RawGroupedTerm::deserialize(entry) {
                        Ok(raw_term) => {
                            set.push(Term::new(raw_term.text, raw_term.weight, category));
                        }
                        Err(error) => {
                            tracing::warn!(
                                category = category.label(),
                                index,
                                %error,
                                "skipping malformed term entry"
                            );
                        }
                    }
                }
            }
        }
        _ => return Err(anyhow!("term file must be a JSON array or object")),
    }

    if set.is_empty() {
        return Err(anyhow!("term file contained no usable terms"));
    }

    set.sort_by_weight();
    Ok(set)
}

fn parse_category(key: &str) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| category.label().eq_ignore_ascii_case(key.trim()))
}
