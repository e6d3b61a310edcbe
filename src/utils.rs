use std::path::PathBuf;

use anyhow::Result;

use anyhow::anyhow;
use directories::ProjectDirs;

pub fn trim_line(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

pub fn strip_controls_and_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            // ANSI escape sequence (ESC … letter)
            '\x1b' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }

            c if c.is_control() => {}

            c => out.push(c),
        }
    }

    out.trim().to_string()
}

/// Length of a source text as stored in the generation tables, in characters.
pub fn text_length(text: &str) -> i64 {
    text.chars().count() as i64
}

pub fn get_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "flashgen")
        .ok_or_else(|| anyhow!("Could not determine project directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_controls_and_escapes() {
        let input = "\x1b[1msk-or-123\x1b[0m\n";
        assert_eq!(strip_controls_and_escapes(input), "sk-or-123");
    }

    #[test]
    fn test_trim_line() {
        assert_eq!(trim_line("  key \n"), Some("key"));
        assert_eq!(trim_line(" \t\n"), None);
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("flashcard", 1), "1 flashcard");
        assert_eq!(pluralize("flashcard", 0), "0 flashcards");
        assert_eq!(pluralize("generation", 3), "3 generations");
    }

    #[test]
    fn text_length_counts_characters() {
        assert_eq!(text_length("abc"), 3);
        assert_eq!(text_length("héllo"), 5);
        assert_eq!(text_length(""), 0);
    }
}
