/// Provisioning plan types.
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A concrete web server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    Apache,
    Nginx,
}

impl ServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerType::Apache => "apache",
            ServerType::Nginx => "nginx",
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            ServerType::Apache => "apache.template.conf",
            ServerType::Nginx => "nginx.template.conf",
        }
    }

    /// Flag passed to certbot to select its installer plugin.
    pub fn certbot_flag(&self) -> &'static str {
        match self {
            ServerType::Apache => "--apache",
            ServerType::Nginx => "--nginx",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apache" => Ok(ServerType::Apache),
            "nginx" => Ok(ServerType::Nginx),
            other => Err(Error::UnsupportedServer(other.to_string())),
        }
    }
}

/// Server type as requested on the command line, before auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerRequest {
    Auto,
    Fixed(ServerType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Ask,
    Yes,
    No,
}

/// Raw options as produced by the option resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub domain: String,
    /// Lowercased server type, empty when neither a flag nor the entry point set one.
    pub server: String,
    pub ssl_mode: SslMode,
    pub certbot_email: Option<String>,
    pub certbot_staging: bool,
    pub assume_yes: bool,
    pub dry_run: bool,
}

/// Fully resolved plan. Built once, read-only during provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub domain: String,
    pub server: ServerType,
    pub run_ssl: bool,
    pub certbot_email: Option<String>,
    pub certbot_staging: bool,
    pub dry_run: bool,
}

impl Plan {
    pub fn config_file_name(&self) -> String {
        format!("{}.conf", self.domain)
    }
}
