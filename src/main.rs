use ikein::{Dispatcher, Environment};
use std::io::Write;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, e.g. `IKEIN_LOG=debug`.
const LOG_VAR: &str = "IKEIN_LOG";

fn main() -> std::process::ExitCode {
    // stdout belongs to the shell wrapper; diagnostics go to stderr only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let argv: Vec<String> = std::env::args().collect();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    let code = match Environment::new().and_then(|mut env| {
        let registry = ikein::bootstrap(&env)?;
        debug!(root = %env.root.display(), "registry ready");
        Ok(Dispatcher::new(&registry).run(&argv, &mut env, &mut stdout))
    }) {
        Ok(code) => code,
        Err(e) => {
            report(&e, &mut stdout);
            1
        }
    };

    std::process::ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Print a startup failure where the shell function shows it, or on stderr when
/// stdout is gone.
fn report(err: &anyhow::Error, stdout: &mut dyn Write) -> bool {
    let message = format!("error: {err:#}");
    match writeln!(stdout, "{message}").and_then(|()| stdout.flush()) {
        Ok(()) => true,
        Err(_) => {
            eprintln!("{message}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_report_writes_to_stdout() {
        let mut out = Vec::new();
        let err = anyhow::anyhow!("bad json").context("can't load config");
        assert!(report(&err, &mut out));
        assert_eq!(String::from_utf8(out).unwrap(), "error: can't load config: bad json\n");
    }

    #[test]
    fn test_report_falls_back_when_stdout_is_closed() {
        assert!(!report(&anyhow::anyhow!("boom"), &mut Closed));
    }
}
