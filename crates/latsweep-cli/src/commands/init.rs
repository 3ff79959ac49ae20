use crate::cli::InitArgs;
use crate::config::{DefaultsConfig, FileConfig};
use crate::error::{CliError, Result};
use std::fs;
use tracing::info;

pub fn run(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(CliError::Argument(format!(
            "'{}' already exists. Use --force to overwrite it.",
            args.path.display()
        )));
    }

    let content = FileConfig::from(&DefaultsConfig::default()).to_toml()?;
    if let Some(parent) = args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.path, content)?;

    info!("Wrote default configuration to {:?}", &args.path);
    println!("Configuration written to: {}", args.path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ConfigArgs, SweepOverrides};
    use crate::config::{CommandOverrides, build_config};

    #[test]
    fn written_file_loads_back_as_the_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("latsweep.toml");

        run(InitArgs {
            path: path.clone(),
            force: false,
        })
        .unwrap();

        let from_file = build_config(
            &ConfigArgs {
                config: Some(path),
                set_values: vec![],
            },
            &SweepOverrides::default(),
            &CommandOverrides::default(),
        )
        .unwrap();
        let builtin = build_config(
            &ConfigArgs::default(),
            &SweepOverrides::default(),
            &CommandOverrides::default(),
        )
        .unwrap();
        assert_eq!(from_file, builtin);
    }

    #[test]
    fn existing_file_needs_force() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("latsweep.toml");
        fs::write(&path, "# mine\n").unwrap();

        let result = run(InitArgs {
            path: path.clone(),
            force: false,
        });
        assert!(matches!(result, Err(CliError::Argument(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");

        run(InitArgs {
            path: path.clone(),
            force: true,
        })
        .unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[calculation]"));
    }
}
