/// SSL mode resolution.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::plan::SslMode;
use crate::prompt::Interaction;

pub const SSL_PROMPT: &str = "Request SSL certificate from Certbot now? [y/N]: ";
pub const EMAIL_PROMPT: &str =
    "Email for Let's Encrypt notices (leave blank to register without email): ";

static AFFIRMATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Yy]([Ee][Ss])?$").unwrap());

/// `y`, `Y`, `yes` and any casing of `yes`.
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE_RE.is_match(answer.trim())
}

/// Decide whether certbot runs.
pub fn should_run_ssl(
    mode: SslMode,
    assume_yes: bool,
    interaction: &mut dyn Interaction,
) -> Result<bool> {
    match mode {
        SslMode::Yes => Ok(true),
        SslMode::No => Ok(false),
        SslMode::Ask if assume_yes => Ok(true),
        SslMode::Ask if interaction.is_interactive() => match interaction.ask(SSL_PROMPT)? {
            Some(answer) => Ok(is_affirmative(&answer)),
            None => Ok(false),
        },
        SslMode::Ask => {
            log::info!("Not running interactively, skipping SSL certificate request");
            Ok(false)
        }
    }
}

/// Ask for a certbot email when SSL will run and none was given. Blank means
/// register without email.
pub fn resolve_email(
    email: Option<String>,
    run_ssl: bool,
    assume_yes: bool,
    interaction: &mut dyn Interaction,
) -> Result<Option<String>> {
    let email = email.filter(|e| !e.trim().is_empty());
    if email.is_some() || !run_ssl || assume_yes || !interaction.is_interactive() {
        return Ok(email);
    }

    let answer = interaction.ask(EMAIL_PROMPT)?;
    Ok(answer
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedInteraction;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "Y", "yes", "YES", "yEs", " y "] {
            assert!(is_affirmative(answer), "{answer}");
        }
        for answer in ["", "n", "no", "ye", "yess", "sure", "yes please"] {
            assert!(!is_affirmative(answer), "{answer}");
        }
    }

    #[test]
    fn test_explicit_modes_never_prompt() {
        let mut io = ScriptedInteraction::with_answers(["n"]);
        assert!(should_run_ssl(SslMode::Yes, false, &mut io).unwrap());
        assert!(!should_run_ssl(SslMode::No, true, &mut io).unwrap());
        assert!(io.asked().is_empty());
    }

    #[test]
    fn test_ask_with_assume_yes() {
        let mut io = ScriptedInteraction::with_answers(["n"]);
        assert!(should_run_ssl(SslMode::Ask, true, &mut io).unwrap());
        assert!(io.asked().is_empty());
    }

    #[test]
    fn test_ask_interactive_uses_answer() {
        let mut io = ScriptedInteraction::with_answers(["Yes"]);
        assert!(should_run_ssl(SslMode::Ask, false, &mut io).unwrap());
        assert_eq!(io.asked(), [SSL_PROMPT]);

        let mut io = ScriptedInteraction::with_answers(["nope"]);
        assert!(!should_run_ssl(SslMode::Ask, false, &mut io).unwrap());

        let mut io = ScriptedInteraction::with_answers(Vec::<String>::new());
        assert!(!should_run_ssl(SslMode::Ask, false, &mut io).unwrap());
    }

    #[test]
    fn test_ask_non_interactive_defaults_off() {
        let mut io = ScriptedInteraction::non_interactive();
        assert!(!should_run_ssl(SslMode::Ask, false, &mut io).unwrap());
        assert!(io.asked().is_empty());
    }

    #[test]
    fn test_email_prompt_only_when_needed() {
        let mut io = ScriptedInteraction::with_answers(["  admin@example.com "]);
        let email = resolve_email(None, true, false, &mut io).unwrap();
        assert_eq!(email.as_deref(), Some("admin@example.com"));

        let mut io = ScriptedInteraction::with_answers([""]);
        assert_eq!(resolve_email(None, true, false, &mut io).unwrap(), None);
        assert_eq!(io.asked(), [EMAIL_PROMPT]);

        let mut io = ScriptedInteraction::with_answers(["x@example.com"]);
        assert_eq!(resolve_email(None, false, false, &mut io).unwrap(), None);
        assert_eq!(resolve_email(None, true, true, &mut io).unwrap(), None);
        assert_eq!(
            resolve_email(Some("a@b.c".into()), true, false, &mut io).unwrap(),
            Some("a@b.c".to_string())
        );
        assert!(io.asked().is_empty());
    }
}
