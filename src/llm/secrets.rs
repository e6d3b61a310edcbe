//! OpenRouter API key storage.
//!
//! The key is read from `FLASHGEN_OPENROUTER_API_KEY` first and falls back to
//! `auth.json` in the data directory, keyed by provider name.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dialoguer::{Password, theme::ColorfulTheme};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;
use crate::utils::{get_data_dir, strip_controls_and_escapes, trim_line};

pub const API_KEY_ENV: &str = "FLASHGEN_OPENROUTER_API_KEY";

const AUTH_FILE_NAME: &str = "auth.json";
const OPENROUTER_PROVIDER: &str = "openrouter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    AuthFile,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::AuthFile => "local auth file",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AuthFile {
    #[serde(flatten)]
    providers: HashMap<String, ProviderAuth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderAuth {
    key: String,
}

/// Returns the configured key and where it came from, or `None`.
pub fn lookup_api_key() -> Result<Option<(String, ApiKeySource)>> {
    if let Ok(value) = env::var(API_KEY_ENV)
        && let Some(key) = trim_line(&value)
    {
        return Ok(Some((key.to_string(), ApiKeySource::Environment)));
    }

    Ok(read_key_from(&auth_file_path()?)?.map(|key| (key, ApiKeySource::AuthFile)))
}

/// Returns the configured key, prompting for one (and storing it) if none is set.
pub fn resolve_api_key() -> Result<String> {
    if let Some((key, _)) = lookup_api_key()? {
        return Ok(key);
    }

    let key = prompt_for_api_key()?;
    if key.is_empty() {
        bail!(
            "No API key provided. Set {} or run `flashgen llm --set <KEY>`.",
            API_KEY_ENV
        );
    }
    store_api_key(&key)?;
    Ok(key)
}

pub fn store_api_key(api_key: &str) -> Result<()> {
    store_key_at(&auth_file_path()?, api_key)
}

pub fn clear_api_key() -> Result<bool> {
    clear_key_at(&auth_file_path()?)
}

fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} (https://openrouter.ai/settings/keys) to generate flashcards. It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your OpenRouter API key")
    );
    println!(
        "{}",
        Palette::dim("Run with --mock to try the generator without a key.")
    );
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()
        .context("Failed to read API key")?;

    Ok(strip_controls_and_escapes(&raw))
}

fn auth_file_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(AUTH_FILE_NAME))
}

fn read_key_from(path: &Path) -> Result<Option<String>> {
    let Some(auth) = read_auth_file(path)? else {
        return Ok(None);
    };
    Ok(auth
        .providers
        .get(OPENROUTER_PROVIDER)
        .and_then(|entry| trim_line(&entry.key))
        .map(str::to_string))
}

fn store_key_at(path: &Path, api_key: &str) -> Result<()> {
    let trimmed = trim_line(api_key).with_context(|| "Cannot store an empty API key")?;

    let mut auth = read_auth_file(path)?.unwrap_or_default();
    auth.providers.insert(
        OPENROUTER_PROVIDER.to_string(),
        ProviderAuth {
            key: trimmed.to_string(),
        },
    );
    write_auth_file(path, &auth)
}

fn clear_key_at(path: &Path) -> Result<bool> {
    let Some(mut auth) = read_auth_file(path)? else {
        return Ok(false);
    };

    if auth.providers.remove(OPENROUTER_PROVIDER).is_none() {
        return Ok(false);
    }

    if auth.providers.is_empty() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove empty auth file at {}", path.display()))?;
        return Ok(true);
    }

    write_auth_file(path, &auth)?;
    Ok(true)
}

fn read_auth_file(path: &Path) -> Result<Option<AuthFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read auth file at {}", path.display()));
        }
    };

    if contents.trim().is_empty() {
        return Ok(Some(AuthFile::default()));
    }

    let parsed = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse auth file at {}", path.display()))?;
    Ok(Some(parsed))
}

fn write_auth_file(path: &Path, value: &AuthFile) -> Result<()> {
    let contents = format!("{}\n", serde_json::to_string_pretty(value)?);
    fs::write(path, contents)
        .with_context(|| format!("Failed to write auth file at {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_has_no_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        assert!(read_key_from(&path).unwrap().is_none());
        assert!(!clear_key_at(&path).unwrap());
    }

    #[test]
    fn empty_file_has_no_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(&path, "  \n").unwrap();
        assert!(read_key_from(&path).unwrap().is_none());
    }

    #[test]
    fn store_overwrites_then_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");

        store_key_at(&path, "fake_key").unwrap();
        store_key_at(&path, "  real_key \n").unwrap();
        assert_eq!(read_key_from(&path).unwrap().as_deref(), Some("real_key"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));

        assert!(clear_key_at(&path).unwrap());
        assert!(!path.exists());
        assert!(read_key_from(&path).unwrap().is_none());
    }

    #[test]
    fn clear_keeps_other_providers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        fs::write(
            &path,
            r#"{"openai": {"key": "sk-1"}, "openrouter": {"key": "sk-or-2"}}"#,
        )
        .unwrap();

        assert!(clear_key_at(&path).unwrap());
        assert!(path.exists());
        assert!(read_key_from(&path).unwrap().is_none());
        assert!(fs::read_to_string(&path).unwrap().contains("sk-1"));
    }

    #[test]
    fn empty_key_is_not_stored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auth.json");
        assert!(store_key_at(&path, "   ").is_err());
        assert!(!path.exists());
    }
}
