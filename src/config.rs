/// Configuration serialization and deserialization.
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plan::ServerType;

// config like:
// [paths]
// web_root = "/var/www"
// apache_sites_available = "/etc/apache2/sites-available"
// nginx_sites_available = "/etc/nginx/sites-available"
// nginx_sites_enabled = "/etc/nginx/sites-enabled"
// template_dir = "/usr/share/vhostup/templates"  # default: bundled templates/
// static_dir = "/usr/share/vhostup/static"        # default: bundled static/
//
// [commands]
// systemctl = "systemctl"
// a2ensite = "a2ensite"
// certbot = "certbot"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub web_root: PathBuf,
    pub apache_sites_available: PathBuf,
    pub nginx_sites_available: PathBuf,
    pub nginx_sites_enabled: PathBuf,
    // installation roots, only used by auto-detection
    pub apache_root: PathBuf,
    pub nginx_root: PathBuf,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            web_root: PathBuf::from("/var/www"),
            apache_sites_available: PathBuf::from("/etc/apache2/sites-available"),
            nginx_sites_available: PathBuf::from("/etc/nginx/sites-available"),
            nginx_sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
            apache_root: PathBuf::from("/etc/apache2"),
            nginx_root: PathBuf::from("/etc/nginx"),
            template_dir: bundled_dir("templates"),
            static_dir: bundled_dir("static"),
        }
    }
}

/// Locate a bundled asset directory. Looks next to the running binary and in
/// its ancestors (`<prefix>/<name>` or `<prefix>/share/vhostup/<name>`), then
/// falls back to the source tree the binary was built from.
pub fn bundled_dir(name: &str) -> PathBuf {
    let from_exe = std::env::current_exe().ok().and_then(|exe| {
        exe.ancestors()
            .skip(1)
            .flat_map(|dir| [dir.join(name), dir.join("share").join("vhostup").join(name)])
            .find(|candidate| candidate.is_dir())
    });

    from_exe.unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(name))
}

impl PathsConfig {
    /// Directory holding `{domain}.conf` for the given server.
    pub fn sites_available(&self, server: ServerType) -> &Path {
        match server {
            ServerType::Apache => &self.apache_sites_available,
            ServerType::Nginx => &self.nginx_sites_available,
        }
    }

    pub fn site_root(&self, domain: &str) -> PathBuf {
        self.web_root.join(domain).join("public_html")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub systemctl: String,
    pub a2ensite: String,
    pub certbot: String,
    pub nginx: String,
    pub cp: String,
    pub mkdir: String,
    pub sed: String,
    pub ln: String,
    pub apache_service: String,
    pub nginx_service: String,
    /// Colon separated search path used to resolve commands, `$PATH` when unset.
    pub search_path: Option<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            systemctl: "systemctl".into(),
            a2ensite: "a2ensite".into(),
            certbot: "certbot".into(),
            nginx: "nginx".into(),
            cp: "cp".into(),
            mkdir: "mkdir".into(),
            sed: "sed".into(),
            ln: "ln".into(),
            apache_service: "apache2".into(),
            nginx_service: "nginx".into(),
            search_path: None,
        }
    }
}

impl CommandsConfig {
    pub fn service_name(&self, server: ServerType) -> &str {
        match server {
            ServerType::Apache => &self.apache_service,
            ServerType::Nginx => &self.nginx_service,
        }
    }

    pub fn search_path(&self) -> String {
        self.search_path
            .clone()
            .or_else(|| std::env::var("PATH").ok())
            .unwrap_or_default()
    }
}

impl Config {
    /// Load a config file, YAML when the extension says so, TOML otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Resolve the effective configuration: explicit file, then the per-user
    /// file if it exists, then built-in defaults. Environment overrides apply last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::user_config_path().filter(|p| p.is_file()) {
                Some(path) => {
                    log::debug!("Using config file {}", path.display());
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vhostup").join("config.toml"))
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("WEB_ROOT") {
            self.paths.web_root = v.into();
        }
        if let Some(v) = get("APACHE_SITES_AVAILABLE") {
            self.paths.apache_sites_available = v.into();
        }
        if let Some(v) = get("NGINX_SITES_AVAILABLE") {
            self.paths.nginx_sites_available = v.into();
        }
        if let Some(v) = get("NGINX_SITES_ENABLED") {
            self.paths.nginx_sites_enabled = v.into();
        }
        if let Some(v) = get("VHOSTUP_TEMPLATE_DIR") {
            self.paths.template_dir = v.into();
        }
        if let Some(v) = get("VHOSTUP_STATIC_DIR") {
            self.paths.static_dir = v.into();
        }
        if let Some(v) = get("SYSTEMCTL_BIN") {
            self.commands.systemctl = v;
        }
        if let Some(v) = get("A2ENSITE_BIN") {
            self.commands.a2ensite = v;
        }
        if let Some(v) = get("CERTBOT_BIN") {
            self.commands.certbot = v;
        }
    }
}
