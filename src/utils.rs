use std::path::PathBuf;

/// Resolve `command` on a colon separated search path. Commands containing a
/// path separator are checked directly.
pub fn resolve_command(command: &str, search_path: &str) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    which::which_in(command, Some(search_path), cwd).ok()
}

pub fn command_exists(command: &str, search_path: &str) -> bool {
    resolve_command(command, search_path).is_some()
}

/// Backslash-escape the characters that are special in a sed replacement
/// using `/` as delimiter: `/`, `&`, `#` and `\`.
pub fn escape_sed_replacement(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '/' | '&' | '#' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build `s/{token}/{value}/g` with the value escaped.
pub fn sed_substitution(token: &str, value: &str) -> String {
    format!("s/{}/{}/g", token, escape_sed_replacement(value))
}

/// Render a program and its arguments as a shell-quoted command line.
pub fn format_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut words = vec![program];
    words.extend(args.iter().map(|a| a.as_ref()));
    shell_words::join(words)
}

/// Truncate error message to a reasonable number of lines for display
pub fn truncate_error_message(message: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = message.lines().collect();
    if lines.len() <= max_lines {
        message.to_string()
    } else {
        let truncated_lines = &lines[..max_lines];
        format!(
            "{}\n... (truncated {} more lines)",
            truncated_lines.join("\n"),
            lines.len() - max_lines
        )
    }
}
