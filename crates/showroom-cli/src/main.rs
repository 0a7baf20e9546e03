// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::{Config, SourceKind};
use runtime::{CatalogBackend, CatalogRuntime};
use showroom_catalog::{HttpCatalog, MockCatalog};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `showroom --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let source_kind = if options.force_mock {
        SourceKind::Mock
    } else {
        config.source_kind()
    };

    let backend = match source_kind {
        SourceKind::Mock => CatalogBackend::Mock(
            MockCatalog::sample()
                .latency(config.latency()?)
                .failure_odds(config.failure_odds()),
        ),
        SourceKind::Http => CatalogBackend::Http(
            HttpCatalog::new(config.base_url(), config.timeout()?).with_context(|| {
                format!(
                    "invalid [catalog] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            })?,
        ),
    };

    if options.check_only {
        return Ok(());
    }

    let mut runtime = CatalogRuntime::new(backend);
    showroom_tui::run_app(&mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    force_mock: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        force_mock: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--mock" => {
                options.force_mock = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("showroom");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --mock                   Use the built-in demo catalog regardless of config");
    println!("  --check                  Validate config + catalog source, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/showroom-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                force_mock: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.force_mock);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_mock_flag() -> Result<()> {
        let options = parse_cli_args(vec!["--mock"], default_options_path())?;
        assert!(options.force_mock);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
