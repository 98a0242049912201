//! HTTP client construction for metadata lookups.
//!
//! Centralizes timeout, user-agent, compression and proxy handling so every
//! lookup client behaves the same on the wire.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::{LookupError, TransportFailure};

/// Builds the lookup HTTP client with the given timeouts.
///
/// `source_name` is used only in log lines and error messages.
///
/// # Errors
///
/// Returns [`LookupError::Transport`] with [`TransportFailure::Request`] when
/// the client cannot be constructed.
pub(crate) fn build_lookup_http_client(
    source_name: &str,
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Client, LookupError> {
    let user_agent = user_agent::default_lookup_user_agent();

    match try_build_client(&user_agent, connect_timeout, request_timeout, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings. Retry with env-proxy support only.
            warn!(
                source = source_name,
                "Lookup client hit system proxy panic; using env-proxy fallback builder"
            );
            try_build_client(&user_agent, connect_timeout, request_timeout, true)
                .map_err(|failure| construction_error(source_name, &failure))
        }
        Err(failure) => Err(construction_error(source_name, &failure)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn construction_error(source_name: &str, failure: &BuildClientFailure) -> LookupError {
    let reason = match failure {
        BuildClientFailure::Panic => {
            format!("{source_name} HTTP client construction panicked while initializing networking")
        }
        BuildClientFailure::Build(error) => {
            format!("{source_name} HTTP client construction failed: {error}")
        }
    };
    LookupError::transport("", TransportFailure::Request, &reason)
}

fn try_build_client(
    user_agent: &str,
    connect_timeout: Duration,
    request_timeout: Duration,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .user_agent(user_agent)
            .gzip(true);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Maps a reqwest send/read error onto the transport classification.
pub(crate) fn classify_reqwest_error(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_connect() {
        TransportFailure::Connect
    } else if let Some(status) = error.status() {
        TransportFailure::Status(status.as_u16())
    } else if error.is_body() || error.is_decode() {
        TransportFailure::Body
    } else {
        TransportFailure::Request
    }
}
