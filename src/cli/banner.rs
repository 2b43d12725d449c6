// src/cli/banner.rs — Start-up banner

const LOGO: &str = r#"
  _
 | |   _   _ _ __   __ _
 | |  | | | | '_ \ / _` |
 | |__| |_| | | | | (_| |
 |_____\__,_|_| |_|\__,_|
"#;

pub fn banner() -> String {
    format!(
        "{LOGO}\n luna v{} - vulnerability-check console\n type 'help' for a list of commands\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_mentions_version() {
        assert!(banner().contains(env!("CARGO_PKG_VERSION")));
    }
}
