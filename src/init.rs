use colored::*;
use std::{fs, path::Path};

use jdocs::config::CONFIG_FILE;

const TEMPLATE: &str = r#"# jdocs Configuration File

# Directory holding the installed documentation bundle
# Defaults to "./javadocs"
store_root = "./javadocs"

# Where to download the documentation bundle (.tar.gz) from.
# The bundle is fetched again only when this value changes.
# Can also be set through the JDOCS_BUNDLE_URL environment variable.
# bundle_url = "https://example.com/javadocs-21.tar.gz"

# Give up on a download after this many seconds
fetch_timeout_secs = 120
"#;

pub fn init_config(force: bool) -> Result<(), String> {
    write_template(Path::new(CONFIG_FILE), force)?;

    println!("{} Created {}", "✅".green(), CONFIG_FILE);
    println!("\n{}", "Configuration file created with defaults:".cyan());
    println!("  {} store_root = \"./javadocs\"", "•".blue());
    println!("  {} fetch_timeout_secs = 120", "•".blue());
    println!(
        "\n{}",
        format!("Set bundle_url in {} to download documentation.", CONFIG_FILE).cyan()
    );

    Ok(())
}

fn write_template(config_path: &Path, force: bool) -> Result<(), String> {
    if config_path.exists() && !force {
        return Err(format!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        ));
    }

    fs::write(config_path, TEMPLATE)
        .map_err(|e| format!("Failed to create {}: {}", config_path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdocs::config::Config;

    #[test]
    fn test_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        write_template(&path, false).unwrap();

        let config: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.store_root, defaults.store_root);
        assert_eq!(config.fetch_timeout_secs, defaults.fetch_timeout_secs);
        assert_eq!(config.bundle_url, None);
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "store_root = \"/custom\"\n").unwrap();

        assert!(write_template(&path, false).is_err());
        assert!(fs::read_to_string(&path).unwrap().contains("/custom"));

        write_template(&path, true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("./javadocs"));
    }
}
