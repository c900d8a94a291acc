//! Credential configuration loader
//!
//! Reads `CLIENT_ID`, `CLIENT_SECRET`, and `VECTRA_URL` from an env file
//! (default `cred.env`), falling back to the process environment for any
//! variable the file does not define. All three are required; missing ones
//! are reported by name. The base URL is normalized to end with `/`.
//!
//! The env file is parsed without mutating the process environment, so
//! loading is side-effect free and repeatable.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;
use vectra_domain::{Result, VectraConfig, VectraError};

const CLIENT_ID: &str = "CLIENT_ID";
const CLIENT_SECRET: &str = "CLIENT_SECRET";
const VECTRA_URL: &str = "VECTRA_URL";

/// Load configuration from an env file.
///
/// # Errors
/// Returns `VectraError::Config` naming every missing variable when the
/// file and the process environment together do not provide all three
/// required values.
pub fn load(env_file: &Path) -> Result<VectraConfig> {
    let file_vars = read_env_file(env_file);

    let mut missing = Vec::new();
    let client_id = lookup(&file_vars, CLIENT_ID, &mut missing);
    let client_secret = lookup(&file_vars, CLIENT_SECRET, &mut missing);
    let base_url = lookup(&file_vars, VECTRA_URL, &mut missing);

    if !missing.is_empty() {
        return Err(VectraError::Config(format!(
            "missing required environment variables in {}: {}",
            env_file.display(),
            missing.join(", ")
        )));
    }

    // lookup() recorded nothing missing, so all three values are present.
    match (client_id, client_secret, base_url) {
        (Some(id), Some(secret), Some(url)) => Ok(VectraConfig::new(id, secret, url)),
        _ => Err(VectraError::Config("incomplete configuration".to_string())),
    }
}

/// Parse the env file into a map, tolerating a missing file.
fn read_env_file(env_file: &Path) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    match dotenvy::from_path_iter(env_file) {
        Ok(iter) => {
            for item in iter {
                match item {
                    Ok((key, value)) => {
                        vars.insert(key, value);
                    }
                    Err(e) => debug!(error = %e, "skipping malformed env file entry"),
                }
            }
        }
        Err(e) => {
            debug!(path = %env_file.display(), error = %e, "env file not loaded; relying on process environment");
        }
    }
    vars
}

/// File value first, process environment second; empty values count as
/// missing.
fn lookup(
    file_vars: &HashMap<String, String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = file_vars
        .get(name)
        .cloned()
        .or_else(|| std::env::var(name).ok())
        .filter(|v| !v.is_empty());
    if value.is_none() {
        missing.push(name);
    }
    value
}
