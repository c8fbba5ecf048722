//! Shell completion using clap_complete's dynamic completion.
//!
//! Id arguments complete from the completion cache of the session being
//! typed. The session comes from the command line, then the environment, then
//! the config file. Completing never talks to the service.

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};
use sfsclient::cache::CompletionCache;
use sfsclient::config::{config_dir, SfsConfig};
use std::path::Path;

/// `--flag value` or `--flag=value`.
fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{}=", flag);
    args.iter()
        .enumerate()
        .find_map(|(i, arg)| {
            if arg == flag {
                args.get(i + 1).cloned()
            } else {
                arg.strip_prefix(&prefix).map(String::from)
            }
        })
        .filter(|value| !value.trim().is_empty())
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Endpoint and token of the command line being completed.
fn session(args: &[String]) -> Option<(String, Option<String>)> {
    let endpoint = flag_value(args, "--endpoint")
        .or_else(|| env_value("OS_SHARE_ENDPOINT"))
        .or_else(|| {
            config_dir()
                .ok()
                .and_then(|dir| SfsConfig::load(dir).ok())
                .and_then(|config| config.endpoint)
        })?;
    let token = flag_value(args, "--os-token").or_else(|| env_value("OS_TOKEN"));
    Some((endpoint, token))
}

fn candidates(base: &Path, kind: &str, args: &[String]) -> Vec<CompletionCandidate> {
    let Some((endpoint, token)) = session(args) else {
        return vec![];
    };
    CompletionCache::for_session(base, &endpoint, token.as_deref())
        .ids(kind)
        .into_iter()
        .map(CompletionCandidate::new)
        .collect()
}

/// Completer for arguments that take a `kind` id (`share`, `snapshot`, ...).
pub fn cached_ids(kind: &'static str) -> ArgValueCandidates {
    ArgValueCandidates::new(move || {
        let Some(base) = CompletionCache::default_base() else {
            return vec![];
        };
        let args: Vec<String> = std::env::args().collect();
        candidates(&base, kind, &args)
    })
}
