use std::env;
use std::sync::OnceLock;

use rayon::ThreadPoolBuilder;

static POOL_INIT: OnceLock<Result<(), String>> = OnceLock::new();

const THREADS_VAR: &str = "HOGRS_CPU_THREADS";

/// Builds the process-wide rayon pool that batched region extraction runs
/// on. An explicit `num_threads` wins over the `HOGRS_CPU_THREADS`
/// variable; with neither given, rayon sizes the pool itself. Only the
/// first call takes effect, later calls return the cached outcome.
pub fn init_global_thread_pool(num_threads: Option<usize>) -> Result<(), String> {
    POOL_INIT.get_or_init(|| build_pool(num_threads)).clone()
}

fn build_pool(num_threads: Option<usize>) -> Result<(), String> {
    let threads = match num_threads {
        Some(0) => return Err("thread count must be >= 1".to_string()),
        Some(n) => Some(n),
        None => threads_from_env()?,
    };

    let mut builder = ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build_global().map_err(|e| e.to_string())
}

fn threads_from_env() -> Result<Option<usize>, String> {
    match env::var(THREADS_VAR) {
        Ok(raw) => parse_thread_count(&raw).map(Some),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(format!("failed to read {THREADS_VAR}: {err}")),
    }
}

fn parse_thread_count(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!(
            "{THREADS_VAR} must be a positive integer, got '{raw}'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_count_parsing() {
        assert_eq!(parse_thread_count("4"), Ok(4));
        assert!(parse_thread_count("0").is_err());
        assert!(parse_thread_count("-1").is_err());
        assert!(parse_thread_count("many").is_err());
        assert!(parse_thread_count("").is_err());
    }

    #[test]
    fn zero_thread_request_is_rejected() {
        assert!(build_pool(Some(0)).is_err());
    }

    #[test]
    fn initialization_outcome_is_sticky() {
        let first = init_global_thread_pool(Some(2));
        let second = init_global_thread_pool(Some(4));
        assert_eq!(first, second);
    }
}
