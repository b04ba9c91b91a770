/// Input validation for domains and server types.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::plan::{ServerRequest, ServerType};

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]*[A-Za-z0-9]$").unwrap());

/// Accepts `[A-Za-z0-9][A-Za-z0-9.-]*[A-Za-z0-9]` containing at least one dot.
pub fn validate_domain(domain: &str) -> Result<()> {
    if !DOMAIN_RE.is_match(domain) || !domain.contains('.') {
        return Err(Error::InvalidDomain(domain.to_string()));
    }

    Ok(())
}

/// Validate the requested server type. Empty means no preference and is
/// treated as `auto`.
pub fn validate_server(server: &str) -> Result<ServerRequest> {
    match server {
        "" | "auto" => Ok(ServerRequest::Auto),
        other => other.parse::<ServerType>().map(ServerRequest::Fixed),
    }
}
