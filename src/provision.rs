use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::effects::Effects;
use crate::error::Error;
use crate::plan::{Plan, ServerType};

pub const DOMAIN_TOKEN: &str = "{{DOMAIN_NAME}}";
pub const WEB_ROOT_TOKEN: &str = "{{WEB_ROOT}}";

/// What a provisioning run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub site_root: PathBuf,
    pub config_path: PathBuf,
    pub enabled_link: Option<PathBuf>,
    pub certificate_requested: bool,
}

/// Carries out a resolved plan, step by step. Nothing is rolled back when a
/// step fails.
#[derive(Debug)]
pub struct Provisioner<'a> {
    plan: &'a Plan,
    config: &'a Config,
}

impl<'a> Provisioner<'a> {
    pub fn new(plan: &'a Plan, config: &'a Config) -> Self {
        Self { plan, config }
    }

    pub fn run(&self, effects: &dyn Effects) -> Result<Outcome> {
        let site_root = self.create_site(effects)?;
        let config_path = self.write_server_config(effects)?;

        let enabled_link = match self.plan.server {
            ServerType::Apache => {
                self.enable_apache_site(effects)?;
                None
            }
            ServerType::Nginx => Some(self.enable_nginx_site(effects, &config_path)?),
        };

        if self.plan.run_ssl {
            self.request_certificate(effects)?;
        }

        Ok(Outcome {
            site_root,
            config_path,
            enabled_link,
            certificate_requested: self.plan.run_ssl,
        })
    }

    fn replacements(&self) -> [(&'static str, String); 2] {
        [
            (DOMAIN_TOKEN, self.plan.domain.clone()),
            (
                WEB_ROOT_TOKEN,
                self.config.paths.web_root.to_string_lossy().into_owned(),
            ),
        ]
    }

    fn render(&self, effects: &dyn Effects, file: &Path) -> Result<()> {
        let replacements = self.replacements();
        let pairs: Vec<(&str, &str)> = replacements
            .iter()
            .map(|(token, value)| (*token, value.as_str()))
            .collect();

        effects
            .substitute(file, &pairs)
            .with_context(|| format!("Failed to render placeholders in {}", file.display()))?;
        Ok(())
    }

    /// Create the document root, copy the starter files and render `index.html`.
    fn create_site(&self, effects: &dyn Effects) -> Result<PathBuf> {
        let site_root = self.config.paths.site_root(&self.plan.domain);
        println!("📁 Creating site directory {}", site_root.display());

        effects
            .create_dir(&site_root)
            .context("Failed to create site directory")?;
        effects
            .copy_tree(&self.config.paths.static_dir, &site_root)
            .context("Failed to copy static files")?;

        self.render(effects, &site_root.join("index.html"))?;

        Ok(site_root)
    }

    /// Copy the server template to `{sites-available}/{domain}.conf` and render it.
    fn write_server_config(&self, effects: &dyn Effects) -> Result<PathBuf> {
        let server = self.plan.server;
        let template = self.config.paths.template_dir.join(server.template_name());
        if !template.is_file() {
            return Err(Error::MissingTemplate(template).into());
        }

        let available = self.config.paths.sites_available(server);
        if !available.is_dir() {
            effects
                .create_dir(available)
                .with_context(|| format!("Failed to create {}", available.display()))?;
        }

        let config_path = available.join(self.plan.config_file_name());
        println!("📝 Writing {} config {}", server, config_path.display());

        effects
            .copy_file(&template, &config_path)
            .context("Failed to copy server config template")?;
        self.render(effects, &config_path)?;

        Ok(config_path)
    }

    fn reload_and_restart(&self, effects: &dyn Effects) -> Result<()> {
        let commands = effects.commands();
        let service = commands.service_name(self.plan.server);

        for action in ["reload", "restart"] {
            effects
                .run(&commands.systemctl, &[action.to_string(), service.to_string()])
                .with_context(|| format!("Failed to {} {}", action, service))?;
        }

        Ok(())
    }

    fn enable_apache_site(&self, effects: &dyn Effects) -> Result<()> {
        println!("🔗 Enabling Apache site {}", self.plan.config_file_name());
        effects
            .run(&effects.commands().a2ensite, &[self.plan.config_file_name()])
            .context("Failed to enable Apache site")?;

        self.reload_and_restart(effects)
    }

    /// Link `{sites-enabled}/{domain}.conf` to the available config. An
    /// existing entry is left alone.
    fn enable_nginx_site(&self, effects: &dyn Effects, config_path: &Path) -> Result<PathBuf> {
        let enabled = &self.config.paths.nginx_sites_enabled;
        if !enabled.is_dir() {
            effects
                .create_dir(enabled)
                .with_context(|| format!("Failed to create {}", enabled.display()))?;
        }

        let link = enabled.join(self.plan.config_file_name());
        if link.symlink_metadata().is_ok() {
            println!("✅ Nginx site already enabled: {}", link.display());
        } else {
            println!("🔗 Enabling Nginx site {}", link.display());
            effects
                .symlink(config_path, &link)
                .context("Failed to enable Nginx site")?;
        }

        self.reload_and_restart(effects)?;
        Ok(link)
    }

    /// Arguments for the certbot invocation, in their fixed order.
    pub fn certbot_args(&self) -> Vec<String> {
        let domain = &self.plan.domain;
        let mut args = vec![
            self.plan.server.certbot_flag().to_string(),
            "-d".into(),
            domain.clone(),
            "-d".into(),
            format!("www.{}", domain),
            "--redirect".into(),
            "--non-interactive".into(),
            "--agree-tos".into(),
        ];

        match self.plan.certbot_email {
            Some(ref email) => {
                args.push("--email".into());
                args.push(email.clone());
            }
            None => args.push("--register-unsafely-without-email".into()),
        }

        if self.plan.certbot_staging {
            args.push("--staging".into());
        }

        args
    }

    fn request_certificate(&self, effects: &dyn Effects) -> Result<()> {
        println!("🔒 Requesting SSL certificate for {}", self.plan.domain);
        effects
            .run(&effects.commands().certbot, &self.certbot_args())
            .context("Certbot failed to issue a certificate")?;
        Ok(())
    }
}
