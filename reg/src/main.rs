use clap::{CommandFactory, Parser, Subcommand};
use libreg::config::ColorChoice;

mod commands;
mod context;
mod format;

use context::{AppContext, CliOverrides, VerbosityLevel};

/// reg - Container Registry Inspector
///
/// A CLI tool for inspecting the tags of OCI-compliant container registries.
#[derive(Parser, Debug)]
#[command(name = "reg")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Debug output (can be repeated: -d, -dd)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    debug: u8,

    /// Username for the registry
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Password for the registry
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Do not verify TLS certificates
    #[arg(short = 'k', long, global = true)]
    insecure: bool,

    /// Use plain HTTP instead of HTTPS
    #[arg(short, long = "force-non-ssl", global = true)]
    force_non_ssl: bool,

    /// Do not check the registry's /v2/ endpoint before other requests
    #[arg(long, global = true)]
    skip_ping: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Display version information
    Version,
    /// List the tags of a repository
    Tags(commands::tags::TagsArgs),
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            color: self
                .color
                .as_deref()
                .and_then(|c| c.parse::<ColorChoice>().ok()),
            insecure: self.insecure,
            force_non_ssl: self.force_non_ssl,
            skip_ping: self.skip_ping,
            timeout: self.timeout,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_count(cli.debug);

    let ctx = match AppContext::build(cli.overrides(), verbosity) {
        Ok(ctx) => ctx,
        Err(e) => {
            let fallback =
                AppContext::from_config(libreg::Config::default(), cli.overrides(), verbosity);
            format::error(&fallback, &e.to_string());
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Version => {
            commands::version::print_version();
            Ok(())
        }
        Commands::Tags(args) => commands::tags::handle_tags(&ctx, args).await,
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        format::error(&ctx, &e.to_string());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tags_without_name_is_usage_error() {
        let err = Cli::try_parse_from(["reg", "tags"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reg", "tags", "-v", "-k", "-f", "--skip-ping", "--timeout", "5", "-u", "user", "-p",
            "pass", "-dd", "--color", "never", "localhost:5000/app",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert!(overrides.insecure);
        assert!(overrides.force_non_ssl);
        assert!(overrides.skip_ping);
        assert_eq!(overrides.timeout, Some(5));
        assert_eq!(overrides.username.as_deref(), Some("user"));
        assert_eq!(overrides.color, Some(ColorChoice::Never));
        assert_eq!(VerbosityLevel::from_count(cli.debug), VerbosityLevel::VeryVerbose);

        match cli.command {
            Commands::Tags(args) => {
                assert!(args.verbose);
                assert_eq!(args.name, "localhost:5000/app");
            }
            other => panic!("Expected tags command, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        assert!(Cli::try_parse_from(["reg", "--color", "rainbow", "version"]).is_err());
    }
}
