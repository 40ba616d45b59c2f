use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::CONFIG_FILE;

const CONFIG_TOML_TEMPLATE: &str = r##"# tally configuration. Every key is optional; the values shown are the defaults.

[storage]
# Tasks are kept in <slot>.json in this directory.
slot = "todos"

[display]
# Filter used by `tl list` when --filter is not given: all, pending or completed
default_filter = "all"
# chrono strftime format for due dates
date_format = "%m/%d/%Y %I:%M %p"
show_created = false

[confirm]
# Set to false to delete without asking (same as always passing --yes)
deletes = true
"##;

pub fn cmd_init(args: InitArgs, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    fs::create_dir_all(data_dir)?;
    fs::write(&config_path, CONFIG_TOML_TEMPLATE)?;

    println!("Initialized tally in {}", data_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config_io::read_config;
    use crate::model::task::FilterMode;

    #[test]
    fn template_parses_to_defaults() {
        let config: crate::model::config::Config = toml::from_str(CONFIG_TOML_TEMPLATE).unwrap();
        assert_eq!(config.storage.slot, "todos");
        assert_eq!(config.display.default_filter, FilterMode::All);
        assert_eq!(config.display.date_format, "%m/%d/%Y %I:%M %p");
        assert!(!config.display.show_created);
        assert!(config.confirm.deletes);
    }

    #[test]
    fn init_creates_dir_and_refuses_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("nested/tally");

        cmd_init(InitArgs { force: false }, &dir).unwrap();
        assert!(dir.join(CONFIG_FILE).is_file());
        assert!(read_config(&dir).is_ok());

        fs::write(dir.join(CONFIG_FILE), "[storage]\nslot = \"work\"\n").unwrap();
        assert!(cmd_init(InitArgs { force: false }, &dir).is_err());
        assert_eq!(read_config(&dir).unwrap().storage.slot, "work");

        cmd_init(InitArgs { force: true }, &dir).unwrap();
        assert_eq!(read_config(&dir).unwrap().storage.slot, "todos");
    }
}
