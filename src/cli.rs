/// CLI interface and entry points.
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, FromArgMatches, Parser};
use log::LevelFilter;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline;
use crate::plan::{Options, ServerType, SslMode};
use crate::prompt::TerminalInteraction;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "vhostup")]
#[command(
    about = "🌐 Static site provisioning - create an Apache or Nginx virtual host and optionally request a Certbot certificate"
)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Domain to provision (e.g. example.com)
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Web server type: apache, nginx or auto
    #[arg(short, long, value_name = "TYPE", overrides_with_all = ["auto", "apache", "nginx"])]
    pub server: Option<String>,

    /// Detect the installed web server
    #[arg(long, overrides_with_all = ["server", "apache", "nginx"])]
    pub auto: bool,

    /// Use Apache
    #[arg(long, overrides_with_all = ["server", "auto", "nginx"])]
    pub apache: bool,

    /// Use Nginx
    #[arg(long, overrides_with_all = ["server", "auto", "apache"])]
    pub nginx: bool,

    /// Request a certificate with Certbot
    #[arg(long, overrides_with = "no_ssl")]
    pub ssl: bool,

    /// Do not request a certificate
    #[arg(long, overrides_with = "ssl")]
    pub no_ssl: bool,

    /// Email used to register with Let's Encrypt
    #[arg(long, value_name = "EMAIL")]
    pub certbot_email: Option<String>,

    /// Use the Let's Encrypt staging environment
    #[arg(long)]
    pub certbot_staging: bool,

    /// Answer yes to every prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Print what would be done without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Identity of the binary that was started. The server specific entry points
/// preselect a server type which explicit flags still override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub default_server: Option<ServerType>,
}

impl Invocation {
    pub const UNIFIED: Invocation = Invocation {
        program: "vhostup",
        default_server: None,
    };
    pub const APACHE: Invocation = Invocation {
        program: "vhostup-apache",
        default_server: Some(ServerType::Apache),
    };
    pub const NGINX: Invocation = Invocation {
        program: "vhostup-nginx",
        default_server: Some(ServerType::Nginx),
    };
}

#[derive(Debug)]
pub enum Action {
    Help(String),
    Provision(Cli),
}

/// Parse `args` (without the program name).
pub fn parse_args<I, S>(invocation: Invocation, args: I) -> Result<Action>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from(invocation.program))
        .chain(args.into_iter().map(Into::into));

    let matches = Cli::command()
        .name(invocation.program)
        .bin_name(invocation.program)
        .try_get_matches_from(argv);

    let matches = match matches {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(Action::Help(e.render().to_string()));
        }
        Err(e) => return Err(usage_error(&e)),
    };

    let cli = Cli::from_arg_matches(&matches).map_err(|e| usage_error(&e))?;
    Ok(Action::Provision(cli))
}

fn usage_error(err: &clap::Error) -> Error {
    let arg = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(s)) => s.split_whitespace().next().unwrap_or_default().to_string(),
        _ => String::new(),
    };

    // clap reports a flag with no value as an invalid empty value
    let empty_value = matches!(
        err.get(ContextKind::InvalidValue),
        Some(ContextValue::String(v)) if v.is_empty()
    );

    match err.kind() {
        ErrorKind::InvalidValue if empty_value && !arg.is_empty() => Error::MissingArgument(arg),
        ErrorKind::InvalidUtf8 => Error::InvalidOption("argument is not valid UTF-8".to_string()),
        _ if !arg.is_empty() => Error::InvalidOption(arg),
        _ => Error::InvalidOption(err.kind().as_str().unwrap_or("invalid arguments").to_string()),
    }
}

impl Cli {
    /// Turn parsed flags into options, applying the entry point default.
    pub fn options(&self, invocation: Invocation) -> Result<Options> {
        let domain = self
            .domain
            .clone()
            .filter(|d| !d.is_empty())
            .ok_or(Error::MissingDomain)?;

        let server = if let Some(ref server) = self.server {
            server.clone()
        } else if self.auto {
            "auto".to_string()
        } else if self.apache {
            ServerType::Apache.to_string()
        } else if self.nginx {
            ServerType::Nginx.to_string()
        } else {
            invocation
                .default_server
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        let ssl_mode = if self.ssl {
            SslMode::Yes
        } else if self.no_ssl {
            SslMode::No
        } else {
            SslMode::Ask
        };

        Ok(Options {
            domain,
            server: server.to_lowercase(),
            ssl_mode,
            certbot_email: self.certbot_email.clone(),
            certbot_staging: self.certbot_staging,
            assume_yes: self.yes,
            dry_run: self.dry_run,
        })
    }
}

/// Shared `main` of every entry point.
pub fn run_main(invocation: Invocation) {
    let cli = match parse_args(invocation, std::env::args_os().skip(1)) {
        Ok(Action::Help(text)) => {
            print!("{}", text);
            return;
        }
        Ok(Action::Provision(cli)) => cli,
        Err(e) => fail(e),
    };

    // init logger
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::from_str(&cli.log_level).unwrap_or(LevelFilter::Warn))
        .init();

    let options = match cli.options(invocation) {
        Ok(options) => options,
        Err(e) => fail(e),
    };

    let config = match Config::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(e),
    };

    let mut interaction = TerminalInteraction;
    if let Err(e) = pipeline::execute(options, &config, &mut interaction) {
        fail(e);
    }
}

fn fail<E: Into<anyhow::Error>>(err: E) -> ! {
    let err = err.into();
    log::debug!("{:?}", err);
    eprintln!("Error: {:#}", err);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(invocation: Invocation, args: &[&str]) -> Result<Cli> {
        match parse_args(invocation, args.iter().copied())? {
            Action::Provision(cli) => Ok(cli),
            Action::Help(_) => panic!("unexpected help"),
        }
    }

    fn options(invocation: Invocation, args: &[&str]) -> Result<Options> {
        parse(invocation, args)?.options(invocation)
    }

    #[test]
    fn test_defaults() {
        let opts = options(Invocation::UNIFIED, &["-d", "example.com"]).unwrap();
        assert_eq!(
            opts,
            Options {
                domain: "example.com".into(),
                server: String::new(),
                ssl_mode: SslMode::Ask,
                certbot_email: None,
                certbot_staging: false,
                assume_yes: false,
                dry_run: false,
            }
        );
    }

    #[test]
    fn test_all_flags() {
        let opts = options(
            Invocation::UNIFIED,
            &[
                "--domain",
                "example.net",
                "--server",
                "NGINX",
                "--ssl",
                "--certbot-email",
                "admin@example.net",
                "--certbot-staging",
                "-y",
                "--dry-run",
            ],
        )
        .unwrap();

        assert_eq!(opts.server, "nginx");
        assert_eq!(opts.ssl_mode, SslMode::Yes);
        assert_eq!(opts.certbot_email.as_deref(), Some("admin@example.net"));
        assert!(opts.certbot_staging && opts.assume_yes && opts.dry_run);
    }

    #[test]
    fn test_entry_point_default_and_override() {
        let opts = options(Invocation::APACHE, &["-d", "example.com"]).unwrap();
        assert_eq!(opts.server, "apache");

        let opts = options(Invocation::APACHE, &["-d", "example.com", "-s", "nginx"]).unwrap();
        assert_eq!(opts.server, "nginx");

        let opts = options(Invocation::NGINX, &["-d", "example.com", "--auto"]).unwrap();
        assert_eq!(opts.server, "auto");
    }

    #[test]
    fn test_last_flag_wins() {
        let opts = options(Invocation::UNIFIED, &["-d", "a.com", "--apache", "--nginx"]).unwrap();
        assert_eq!(opts.server, "nginx");

        let opts = options(Invocation::UNIFIED, &["-d", "a.com", "--nginx", "-s", "apache"]).unwrap();
        assert_eq!(opts.server, "apache");

        let opts = options(Invocation::UNIFIED, &["-d", "a.com", "--ssl", "--no-ssl"]).unwrap();
        assert_eq!(opts.ssl_mode, SslMode::No);
    }

    #[test]
    fn test_missing_domain() {
        assert!(matches!(
            options(Invocation::UNIFIED, &["--nginx"]),
            Err(Error::MissingDomain)
        ));
    }

    #[test]
    fn test_missing_value() {
        match parse(Invocation::UNIFIED, &["--domain"]) {
            Err(Error::MissingArgument(flag)) => assert_eq!(flag, "--domain"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_option() {
        match parse(Invocation::UNIFIED, &["-d", "a.com", "--bogus"]) {
            Err(Error::InvalidOption(flag)) => assert_eq!(flag, "--bogus"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_non_utf8_value() {
        use std::os::unix::ffi::OsStringExt;

        let args = [
            OsString::from("-d"),
            OsString::from_vec(b"ex\xffample.com".to_vec()),
        ];
        match parse_args(Invocation::UNIFIED, args) {
            Err(Error::InvalidOption(message)) => assert!(message.contains("UTF-8")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_help() {
        match parse_args(Invocation::NGINX, ["--help"]).unwrap() {
            Action::Help(text) => assert!(text.contains("vhostup-nginx")),
            Action::Provision(_) => panic!("expected help"),
        }
    }
}
