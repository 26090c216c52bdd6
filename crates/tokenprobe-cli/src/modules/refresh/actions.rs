use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokenprobe_core::{
    classify, default_cache_dir, format_elapsed, list_cache_entries, load_cache_entry,
    no_cache_found, validate_cached_tokens, LoadedCache, ProbeError, RefreshError, Token,
};
use tracing::{debug, info, warn};

use super::http::TokenSource;
use super::types::{LoopOutcome, ProbeOutcome};
use crate::modules::report::{print_cache_validation, print_token_info};
use crate::modules::system::{LoopTimings, ProbeConfig};

/// Loads the cached credentials, validates them and drives refresh cycles until one fails.
pub(crate) async fn run_probe<S, W>(
    out: &mut W,
    config: &ProbeConfig,
    source: &S,
) -> anyhow::Result<ProbeOutcome>
where
    S: TokenSource,
    W: Write,
{
    writeln!(out, "Looking for kubelogin token cache...")?;
    let cache_dir = match config.cache_dir.clone() {
        Some(dir) => dir,
        None => match default_cache_dir() {
            Ok(dir) => dir,
            Err(err) => {
                print_cache_failure(out, &err)?;
                return Ok(ProbeOutcome::Aborted);
            }
        },
    };
    writeln!(out, "Searching cache directory: {}", cache_dir.display())?;
    let loaded = match load_first_cache(out, &cache_dir)? {
        Ok(loaded) => loaded,
        Err(err) => {
            print_cache_failure(out, &err)?;
            return Ok(ProbeOutcome::Aborted);
        }
    };
    writeln!(out, "Successfully loaded tokens from: {}", display_name(&loaded.path))?;

    let warnings = match validate_cached_tokens(&loaded.tokens) {
        Ok(warnings) => warnings,
        Err(err) => {
            writeln!(out, "Error: {err}")?;
            if matches!(err, ProbeError::MissingToken { field } if field == "Refresh token") {
                writeln!(
                    out,
                    "Note: Some OIDC configurations may not provide refresh tokens"
                )?;
            }
            return Ok(ProbeOutcome::Aborted);
        }
    };
    for warning in warnings {
        writeln!(out, "Warning: {}", warning.message())?;
    }
    print_cache_validation(out, &loaded.tokens, Utc::now())?;

    let now = Utc::now();
    let token = Token::from_cache(&loaded.tokens, expiry_after(now, config.timings.forced_expiry));
    print_token_info(out, "Initial Token Information", &token, now)?;

    let outcome = RefreshLoop::new(source, config.timings).run(out, token).await?;
    writeln!(out, "Token refresh loop completed.")?;
    Ok(ProbeOutcome::Finished(outcome))
}

/// Visits the cache entries in name order and returns the first one that parses.
fn load_first_cache<W: Write>(
    out: &mut W,
    dir: &Path,
) -> io::Result<Result<LoadedCache, ProbeError>> {
    let paths = match list_cache_entries(dir) {
        Ok(paths) => paths,
        Err(err) => return Ok(Err(err)),
    };
    for path in paths {
        writeln!(out, "Checking file: {}", display_name(&path))?;
        match load_cache_entry(&path) {
            Ok(tokens) => return Ok(Ok(LoadedCache { path, tokens })),
            Err(err) => debug!(path = %path.display(), "skipping cache file: {err}"),
        }
    }
    Ok(Err(no_cache_found()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_cache_failure<W: Write>(out: &mut W, err: &ProbeError) -> io::Result<()> {
    writeln!(out, "Failed to read token cache: {err}")?;
    writeln!(out)?;
    writeln!(out, "Troubleshooting tips:")?;
    writeln!(
        out,
        "1. Make sure you've authenticated with kubectl using kubelogin first:"
    )?;
    writeln!(out, "   kubectl --user oidc get pods -A")?;
    writeln!(out, "2. Check if cache directory exists:")?;
    writeln!(out, "   ls -la ~/.kube/cache/oidc-login/")
}

/// `now + window`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(window)
        .ok()
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

enum LoopState {
    Wait,
    Refresh,
    Report {
        result: Result<Token, RefreshError>,
        elapsed: Duration,
    },
    Halt(LoopOutcome),
}

pub(crate) struct RefreshLoop<'a, S> {
    source: &'a S,
    timings: LoopTimings,
}

impl<'a, S: TokenSource> RefreshLoop<'a, S> {
    pub(crate) fn new(source: &'a S, timings: LoopTimings) -> Self {
        Self { source, timings }
    }

    pub(crate) async fn run<W: Write>(
        &self,
        out: &mut W,
        initial: Token,
    ) -> io::Result<LoopOutcome> {
        let mut current = initial;
        let mut cycle: u32 = 1;
        let mut state = LoopState::Wait;
        loop {
            state = match state {
                LoopState::Wait => {
                    writeln!(out, "=== REFRESH CYCLE {cycle} ===")?;
                    self.countdown(out).await?;
                    LoopState::Refresh
                }
                LoopState::Refresh => {
                    writeln!(out, "Attempting token refresh (cycle {cycle})...")?;
                    let start = Instant::now();
                    let result = self.source.token(&current).await;
                    LoopState::Report {
                        result,
                        elapsed: start.elapsed(),
                    }
                }
                LoopState::Report {
                    result: Ok(token),
                    elapsed,
                } => {
                    writeln!(out, "Refresh successful! (took {})", format_elapsed(elapsed))?;
                    let label = format!("Refreshed Token Information (Cycle {cycle})");
                    print_token_info(out, &label, &token, Utc::now())?;
                    let forced = expiry_after(Utc::now(), self.timings.forced_expiry);
                    current = token.with_expiry(forced);
                    info!(cycle, elapsed_ms = elapsed.as_millis(), "token refreshed");

                    let completed = cycle;
                    cycle += 1;
                    if self.timings.max_cycles.is_some_and(|max| completed >= max) {
                        LoopState::Halt(LoopOutcome::Completed { cycles: completed })
                    } else {
                        writeln!(
                            out,
                            "Starting next refresh cycle in {} seconds...",
                            self.timings.pause.as_secs()
                        )?;
                        out.flush()?;
                        tokio::time::sleep(self.timings.pause).await;
                        LoopState::Wait
                    }
                }
                LoopState::Report {
                    result: Err(reason),
                    elapsed,
                } => {
                    let cycles = cycle - 1;
                    report_failure(out, &reason, elapsed, cycles)?;
                    warn!(cycle, error = %reason, "token refresh failed");
                    LoopState::Halt(LoopOutcome::Failed { cycles, reason })
                }
                LoopState::Halt(outcome) => return Ok(outcome),
            };
        }
    }

    async fn countdown<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let ticks = self.timings.wait.as_secs();
        writeln!(out, "Waiting {ticks} seconds for token to expire...")?;
        for remaining in (1..=ticks).rev() {
            write!(out, "\rCountdown: {remaining:2} seconds remaining")?;
            out.flush()?;
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        if ticks > 0 {
            writeln!(out)?;
        }
        Ok(())
    }
}

fn report_failure<W: Write>(
    out: &mut W,
    reason: &RefreshError,
    elapsed: Duration,
    cycles: u32,
) -> io::Result<()> {
    writeln!(
        out,
        "Refresh failed after {}: {reason}",
        format_elapsed(elapsed)
    )?;
    writeln!(out)?;
    for line in classify(&reason.to_string()).remediation() {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out, "Completed {cycles} successful refresh cycles.")
}
