/// Web server auto-detection.
use crate::config::Config;
use crate::error::{Error, Result};
use crate::plan::ServerType;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores {
    pub apache: u32,
    pub nginx: u32,
}

impl Scores {
    /// Nginx wins ties. Both zero means nothing was found.
    pub fn choose(&self) -> Result<ServerType> {
        if self.apache == 0 && self.nginx == 0 {
            return Err(Error::AutoDetectionFailed);
        }

        if self.nginx >= self.apache {
            Ok(ServerType::Nginx)
        } else {
            Ok(ServerType::Apache)
        }
    }
}

fn points(present: bool, weight: u32) -> u32 {
    if present {
        weight
    } else {
        0
    }
}

/// Score how present each server looks on this machine.
pub fn score(config: &Config) -> Scores {
    let paths = &config.paths;
    let commands = &config.commands;
    let search_path = commands.search_path();

    let apache = points(paths.apache_sites_available.is_dir(), 2)
        + points(utils::command_exists(&commands.a2ensite, &search_path), 2)
        + points(paths.apache_root.is_dir(), 1);

    let nginx = points(paths.nginx_sites_available.is_dir(), 2)
        + points(paths.nginx_sites_enabled.is_dir(), 1)
        + points(utils::command_exists(&commands.nginx, &search_path), 1)
        + points(paths.nginx_root.is_dir(), 1);

    Scores { apache, nginx }
}

pub fn detect(config: &Config) -> Result<ServerType> {
    let scores = score(config);
    log::debug!(
        "Server detection scores: apache={}, nginx={}",
        scores.apache,
        scores.nginx
    );
    scores.choose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_prefers_nginx_on_tie() {
        let scores = Scores { apache: 3, nginx: 3 };
        assert_eq!(scores.choose().unwrap(), ServerType::Nginx);
    }

    #[test]
    fn test_choose_apache_when_ahead() {
        let scores = Scores { apache: 5, nginx: 4 };
        assert_eq!(scores.choose().unwrap(), ServerType::Apache);
    }

    #[test]
    fn test_choose_fails_when_nothing_found() {
        assert!(matches!(
            Scores::default().choose(),
            Err(Error::AutoDetectionFailed)
        ));
    }
}
