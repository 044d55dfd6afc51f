//! Small shared helpers: where Seogen keeps its files, clock, text clipping.

use std::path::PathBuf;

const DATA_DIR_NAME: &str = ".seogen";

/// The user's home, or the working directory when none can be found.
fn home_or_cwd() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Root of everything Seogen writes: `~/.seogen`.
pub fn data_dir() -> PathBuf {
    home_or_cwd().join(DATA_DIR_NAME)
}

/// Generation records and REPL line history: `~/.seogen/history`.
pub fn history_dir() -> PathBuf {
    data_dir().join("history")
}

/// Resolve a config-supplied path. Only a leading `~` is special.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home_or_cwd(),
        Some(rest) if rest.starts_with('/') => home_or_cwd().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// RFC 3339 wall-clock time, as reported by `/api/health`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Clip `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some(_) => {
            let keep = max_chars.saturating_sub(3);
            let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            format!("{}...", &text[..end])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_short_text() {
        assert_eq!(clip("seo", 3), "seo");
        assert_eq!(clip("", 0), "");
    }

    #[test]
    fn clip_cuts_on_char_boundaries() {
        assert_eq!(clip("rust async runtimes compared", 12), "rust asyn...");
        assert_eq!(clip("キーワード調査ツール", 6), "キーワ...");
        assert_eq!(clip("abcdef", 2), "...");
    }

    #[test]
    fn expand_home_only_touches_leading_tilde() {
        let home = home_or_cwd();
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/history/g.jsonl"), home.join("history/g.jsonl"));
        assert_eq!(expand_home("/var/seogen"), PathBuf::from("/var/seogen"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
        assert_eq!(expand_home("data/~/x"), PathBuf::from("data/~/x"));
    }

    #[test]
    fn history_lives_under_data_dir() {
        let history = history_dir();
        assert_eq!(history.parent(), Some(data_dir().as_path()));
        assert!(data_dir().ends_with(DATA_DIR_NAME));
    }

    #[test]
    fn now_parses_as_rfc3339() {
        assert!(chrono::DateTime::parse_from_rfc3339(&now_rfc3339()).is_ok());
    }
}
