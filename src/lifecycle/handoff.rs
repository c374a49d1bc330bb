//! Follow-up command hand-off for `wait-for-db -c`.
//!
//! The command string is split on whitespace (no shell, no quoting) and the
//! current process is replaced by it. On platforms without `exec` the command
//! runs as a child and its exit code is propagated.

use std::process::Command;

use crate::error::BootstrapError;

/// Split a command string into program and arguments.
pub fn split_command(command: &str) -> Result<Vec<String>, BootstrapError> {
    let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return Err(BootstrapError::configuration("--command", "must not be empty"));
    }
    Ok(argv)
}

/// Replace the current process with `argv`. Returns only on failure.
#[cfg(unix)]
pub fn exec(argv: &[String]) -> BootstrapError {
    use std::os::unix::process::CommandExt;

    let Some((program, args)) = argv.split_first() else {
        return BootstrapError::configuration("--command", "must not be empty");
    };

    tracing::info!(program = %program, args = ?args, "Handing off to command");
    let err = Command::new(program).args(args).exec();
    BootstrapError::startup(format!("exec {}", program), err)
}

/// Run `argv` as a child and exit with its status. Returns only on failure.
#[cfg(not(unix))]
pub fn exec(argv: &[String]) -> BootstrapError {
    let Some((program, args)) = argv.split_first() else {
        return BootstrapError::configuration("--command", "must not be empty");
    };

    tracing::info!(program = %program, args = ?args, "Handing off to command");
    match Command::new(program).args(args).status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(e) => BootstrapError::startup(format!("spawn {}", program), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_any_whitespace() {
        let argv = split_command("python3  starter.py\t--host=0.0.0.0 --port=12345").unwrap();
        assert_eq!(argv, vec!["python3", "starter.py", "--host=0.0.0.0", "--port=12345"]);
    }

    #[test]
    fn test_blank_command_rejected() {
        assert!(split_command("   ").unwrap_err().is_configuration());
    }

    #[test]
    fn test_missing_program_is_startup_error() {
        let err = exec(&["/nonexistent/server-bootstrap-test-binary".to_string()]);
        assert!(err.is_startup());
    }
}
