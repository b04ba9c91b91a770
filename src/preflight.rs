/// Dependency checks run before any change is made.
use crate::config::CommandsConfig;
use crate::error::{Error, Result};
use crate::plan::{Plan, ServerType};
use crate::utils;

/// Commands needed to carry out `plan`, in check order.
pub fn required_commands<'a>(plan: &Plan, commands: &'a CommandsConfig) -> Vec<&'a str> {
    let mut required = vec![
        commands.cp.as_str(),
        commands.mkdir.as_str(),
        commands.sed.as_str(),
    ];

    match plan.server {
        ServerType::Apache => {
            required.push(&commands.a2ensite);
            required.push(&commands.systemctl);
        }
        ServerType::Nginx => {
            required.push(&commands.ln);
            required.push(&commands.systemctl);
        }
    }

    if plan.run_ssl {
        required.push(&commands.certbot);
    }

    required
}

/// Fail on the first required command that cannot be resolved.
pub fn check(plan: &Plan, commands: &CommandsConfig) -> Result<()> {
    let search_path = commands.search_path();

    for command in required_commands(plan, commands) {
        if !utils::command_exists(command, &search_path) {
            return Err(Error::MissingDependency(command.to_string()));
        }
        log::debug!("Found required command: {}", command);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(server: ServerType, run_ssl: bool) -> Plan {
        Plan {
            domain: "example.com".into(),
            server,
            run_ssl,
            certbot_email: None,
            certbot_staging: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_required_commands_apache() {
        let commands = CommandsConfig::default();
        assert_eq!(
            required_commands(&plan(ServerType::Apache, false), &commands),
            ["cp", "mkdir", "sed", "a2ensite", "systemctl"]
        );
    }

    #[test]
    fn test_required_commands_nginx_with_ssl() {
        let commands = CommandsConfig::default();
        assert_eq!(
            required_commands(&plan(ServerType::Nginx, true), &commands),
            ["cp", "mkdir", "sed", "ln", "systemctl", "certbot"]
        );
    }

    #[test]
    fn test_check_reports_first_missing() {
        let dir = tempfile::tempdir().unwrap();
        let commands = CommandsConfig {
            search_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };

        match check(&plan(ServerType::Nginx, false), &commands) {
            Err(Error::MissingDependency(name)) => assert_eq!(name, "cp"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
