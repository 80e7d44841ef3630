mod cli;
mod tui;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

/// Expand a leading `~/` to `$HOME`.
pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::shellexpand;

    #[test]
    fn test_shellexpand_home() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        assert_eq!(shellexpand("~/r.jpg"), format!("{home}/r.jpg"));
    }

    #[test]
    fn test_shellexpand_leaves_other_paths() {
        assert_eq!(shellexpand("/tmp/r.jpg"), "/tmp/r.jpg");
        assert_eq!(shellexpand("r~/x"), "r~/x");
    }
}
