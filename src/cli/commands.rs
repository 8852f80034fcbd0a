//! Command dispatch for the `nodetree` binary

use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument};

use crate::cli::args::Cli;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::script::run_script;
use crate::config::Settings;

/// Resolve settings for this invocation: layered config, then flags.
pub fn resolve_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(apply_cli_overrides(cli, settings))
}

/// Command-line flags win over every config layer.
fn apply_cli_overrides(cli: &Cli, mut settings: Settings) -> Settings {
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    settings
}

#[instrument(level = "debug", skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = resolve_settings(cli)?;
    debug!(?settings, "effective settings");

    if cli.show_config {
        output::header("# effective settings");
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let Some(script) = cli.script.as_deref() else {
        return Ok(());
    };
    let source = read_script(script)?;
    let rendered = run_script(&source, &settings)?;
    if !rendered.is_empty() {
        output::info(&rendered);
    }
    Ok(())
}

fn read_script(path: &Path) -> CliResult<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_script_is_noinput() {
        let err = read_script(Path::new("/definitely/not/here.tree")).unwrap_err();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    fn cli_with_backend(backend: Option<Backend>) -> Cli {
        Cli {
            debug: 0,
            backend,
            config: None,
            show_config: false,
            script: None,
        }
    }

    #[rstest]
    #[case::flag_wins(Some(Backend::Indexed), Backend::Indexed)]
    #[case::file_kept_without_flag(None, Backend::Linked)]
    fn test_backend_flag_overrides_config_file(
        #[case] flag: Option<Backend>,
        #[case] expected: Backend,
    ) {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("nodetree.toml");
        fs::write(&config, "backend = \"linked\"\ncapacity = 4\n").unwrap();

        let from_file = Settings::from_file(&config).unwrap();
        let settings = apply_cli_overrides(&cli_with_backend(flag), from_file);
        assert_eq!(settings.backend, expected);
        assert_eq!(settings.capacity, 4);
    }
}
