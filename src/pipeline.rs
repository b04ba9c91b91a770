/// Resolution stages followed by provisioning.
use anyhow::Result;

use crate::config::Config;
use crate::detect;
use crate::effects::{DryRunEffects, Effects, SystemEffects};
use crate::plan::{Options, Plan, ServerRequest};
use crate::preflight;
use crate::prompt::Interaction;
use crate::provision::{Outcome, Provisioner};
use crate::ssl;
use crate::validate;

/// Validate options, resolve the server type and the SSL decision.
pub fn resolve_plan(
    options: Options,
    config: &Config,
    interaction: &mut dyn Interaction,
) -> Result<Plan> {
    validate::validate_domain(&options.domain)?;

    let server = match validate::validate_server(&options.server)? {
        ServerRequest::Fixed(server) => server,
        ServerRequest::Auto => {
            let server = detect::detect(config)?;
            println!("🔍 Auto-detected web server: {}", server);
            server
        }
    };

    let run_ssl = ssl::should_run_ssl(options.ssl_mode, options.assume_yes, interaction)?;
    let certbot_email =
        ssl::resolve_email(options.certbot_email, run_ssl, options.assume_yes, interaction)?;

    Ok(Plan {
        domain: options.domain,
        server,
        run_ssl,
        certbot_email,
        certbot_staging: options.certbot_staging,
        dry_run: options.dry_run,
    })
}

/// Check dependencies, then provision with the given executor.
pub fn provision(plan: &Plan, config: &Config, effects: &dyn Effects) -> Result<Outcome> {
    preflight::check(plan, &config.commands)?;

    let outcome = Provisioner::new(plan, config).run(effects)?;
    print_summary(plan, &outcome);

    Ok(outcome)
}

/// Full run: resolve, pick the executor once, provision.
pub fn execute(
    options: Options,
    config: &Config,
    interaction: &mut dyn Interaction,
) -> Result<Outcome> {
    let plan = resolve_plan(options, config, interaction)?;
    log::debug!("Resolved plan: {:?}", plan);

    let effects: Box<dyn Effects> = if plan.dry_run {
        Box::new(DryRunEffects::new(config.commands.clone()))
    } else {
        Box::new(SystemEffects::new(config.commands.clone()))
    };

    provision(&plan, config, effects.as_ref())
}

fn print_summary(plan: &Plan, outcome: &Outcome) {
    println!("\n🎉 Site {} ready", plan.domain);
    println!("{}", "─".repeat(50));
    println!("  Server:     {}", plan.server);
    println!("  Site root:  {}", outcome.site_root.display());
    println!("  Config:     {}", outcome.config_path.display());
    if let Some(ref link) = outcome.enabled_link {
        println!("  Enabled:    {}", link.display());
    }
    let ssl = if outcome.certificate_requested {
        "requested via Certbot"
    } else {
        "skipped"
    };
    println!("  SSL:        {}", ssl);
    println!("{}", "─".repeat(50));

    if plan.dry_run {
        println!("💡 Dry run: no changes were made");
    }
}
