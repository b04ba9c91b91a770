/// Side-effecting operations, executed for real or announced in dry-run mode.
use std::cell::RefCell;
use std::path::Path;
use std::process::Command;

use crate::config::CommandsConfig;
use crate::error::{Error, Result};
use crate::utils::{self, format_command, truncate_error_message};

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Every mutation of the filesystem or of a running service goes through this
/// trait. Filesystem primitives are carried out by the configured tools.
pub trait Effects {
    fn commands(&self) -> &CommandsConfig;

    /// Run an external command to completion.
    fn run(&self, program: &str, args: &[String]) -> Result<()>;

    /// `mkdir -p`
    fn create_dir(&self, path: &Path) -> Result<()> {
        self.run(&self.commands().mkdir, &["-p".into(), path_arg(path)])
    }

    /// Copy the contents of `from` into the existing directory `to`.
    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        self.run(
            &self.commands().cp,
            &["-R".into(), format!("{}/.", path_arg(from)), path_arg(to)],
        )
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.run(&self.commands().cp, &[path_arg(from), path_arg(to)])
    }

    /// Replace each literal token with its value, in place.
    fn substitute(&self, file: &Path, replacements: &[(&str, &str)]) -> Result<()> {
        let mut args = vec!["-i".to_string()];
        for (token, value) in replacements {
            args.push("-e".into());
            args.push(utils::sed_substitution(token, value));
        }
        args.push(path_arg(file));
        self.run(&self.commands().sed, &args)
    }

    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.run(
            &self.commands().ln,
            &["-s".into(), path_arg(target), path_arg(link)],
        )
    }
}

/// Performs every operation.
#[derive(Debug)]
pub struct SystemEffects {
    commands: CommandsConfig,
    search_path: String,
}

impl SystemEffects {
    pub fn new(commands: CommandsConfig) -> Self {
        let search_path = commands.search_path();
        Self {
            commands,
            search_path,
        }
    }
}

impl Effects for SystemEffects {
    fn commands(&self) -> &CommandsConfig {
        &self.commands
    }

    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let command_line = format_command(program, args);
        let resolved = utils::resolve_command(program, &self.search_path)
            .ok_or_else(|| Error::MissingDependency(program.to_string()))?;

        log::info!("Running: {}", command_line);
        let output = Command::new(&resolved).args(args).output()?;

        if !output.status.success() {
            let mut message = String::from_utf8_lossy(&output.stderr).into_owned();
            message.push_str(&String::from_utf8_lossy(&output.stdout));
            return Err(Error::CommandFailed {
                command: command_line,
                status: output.status.code().unwrap_or(-1),
                output: truncate_error_message(message.trim(), 3),
            });
        }

        Ok(())
    }
}

/// Announces operations instead of performing them.
#[derive(Debug)]
pub struct DryRunEffects {
    commands: CommandsConfig,
    lines: RefCell<Vec<String>>,
}

impl DryRunEffects {
    pub fn new(commands: CommandsConfig) -> Self {
        Self {
            commands,
            lines: RefCell::new(vec![]),
        }
    }

    /// Announcements made so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Effects for DryRunEffects {
    fn commands(&self) -> &CommandsConfig {
        &self.commands
    }

    fn run(&self, program: &str, args: &[String]) -> Result<()> {
        let line = format!("[dry-run] {}", format_command(program, args));
        println!("{}", line);
        self.lines.borrow_mut().push(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_announces_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("new-dir");
        let effects = DryRunEffects::new(CommandsConfig::default());

        effects.create_dir(&target).unwrap();
        effects
            .substitute(&target.join("index.html"), &[("{{DOMAIN_NAME}}", "a.com")])
            .unwrap();
        effects
            .run("systemctl", &["reload".to_string(), "nginx".to_string()])
            .unwrap();

        assert!(!target.exists());
        let lines = effects.lines();
        assert_eq!(lines[0], format!("[dry-run] mkdir -p {}", target.display()));
        assert!(lines[1].starts_with("[dry-run] sed -i -e 's/{{DOMAIN_NAME}}/a.com/g' "));
        assert_eq!(lines[2], "[dry-run] systemctl reload nginx");
    }

    #[test]
    fn test_system_effects_substitute_escapes_values() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<h1>{{DOMAIN_NAME}}</h1> root={{WEB_ROOT}}\n").unwrap();

        let effects = SystemEffects::new(CommandsConfig::default());
        effects
            .substitute(
                &file,
                &[("{{DOMAIN_NAME}}", "a&b#c.com"), ("{{WEB_ROOT}}", "/srv/www\\x")],
            )
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "<h1>a&b#c.com</h1> root=/srv/www\\x\n"
        );
    }

    #[test]
    fn test_system_effects_reports_failures() {
        let effects = SystemEffects::new(CommandsConfig::default());
        let result = effects.run("mkdir", &["/proc/vhostup-cannot-create".to_string()]);
        assert!(matches!(result, Err(Error::CommandFailed { .. })));

        let result = effects.run("vhostup-no-such-command", &[]);
        assert!(matches!(result, Err(Error::MissingDependency(_))));
    }
}
