//! Registry login/logout and .npmrc credential management
//!
//! Login adds exactly two lines to the user's .npmrc - the scope mapping
//! and the auth token for the Mobiscroll registry - preserving every other
//! line verbatim. Logout removes exactly those lines.

use crate::error::{Error, Result};
use crate::pm::REGISTRY_URL;
use crate::prompt::Prompter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Host-scoped auth token line prefix, npm's `//host/:_authToken=` form.
pub const AUTH_LINE_PREFIX: &str = "//npm.mobiscroll.com/:_authToken=";

/// Scope-to-registry mapping line.
pub const SCOPE_LINE: &str = "@mobiscroll:registry=https://npm.mobiscroll.com";

/// Global .npmrc in the user's home directory.
pub fn npmrc_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_default();
    home.join(".npmrc")
}

/// Add or replace the credential lines in the given .npmrc content.
pub fn upsert_credentials(contents: &str, token: &str) -> String {
    let auth_line = format!("{}{}", AUTH_LINE_PREFIX, token);
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();

    let replaced = match lines.iter_mut().find(|l| l.starts_with(AUTH_LINE_PREFIX)) {
        Some(line) => {
            *line = auth_line.clone();
            true
        }
        None => false,
    };
    if !lines.iter().any(|l| l == SCOPE_LINE) {
        lines.push(SCOPE_LINE.to_string());
    }
    if !replaced {
        lines.push(auth_line);
    }

    lines.join("\n") + "\n"
}

/// Remove the credential lines. Returns the new content and whether
/// anything was actually removed.
pub fn strip_credentials(contents: &str) -> (String, bool) {
    let mut removed = false;
    let lines: Vec<&str> = contents
        .lines()
        .filter(|l| {
            let ours = *l == SCOPE_LINE || l.starts_with(AUTH_LINE_PREFIX);
            removed |= ours;
            !ours
        })
        .collect();
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    (out, removed)
}

pub fn has_credentials(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|c| c.lines().any(|l| l.starts_with(AUTH_LINE_PREFIX)))
        .unwrap_or(false)
}

pub fn write_token(path: &Path, token: &str) -> Result<()> {
    let current = fs::read_to_string(path).unwrap_or_default();
    fs::write(path, upsert_credentials(&current, token)).map_err(|e| Error::io(path, e))
}

/// Returns true when credentials were present and removed.
pub fn remove_token(path: &Path) -> Result<bool> {
    let Ok(current) = fs::read_to_string(path) else {
        return Ok(false);
    };
    let (stripped, removed) = strip_credentials(&current);
    if removed {
        fs::write(path, stripped).map_err(|e| Error::io(path, e))?;
    }
    Ok(removed)
}

#[derive(Serialize)]
struct AddUserRequest<'a> {
    name: &'a str,
    password: &'a str,
    email: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    roles: [&'a str; 0],
    date: String,
}

#[derive(Deserialize)]
struct AddUserResponse {
    token: String,
}

/// Authenticate against the registry with a couchdb-style user document
/// and return the issued token.
pub async fn register_user(
    client: &reqwest::Client,
    username: &str,
    password: &str,
) -> Result<String> {
    let username = username.trim();
    let url = format!(
        "{}/-/user/org.couchdb.user:{}",
        REGISTRY_URL,
        urlencode(username)
    );
    let body = AddUserRequest {
        name: username,
        password: password.trim(),
        // Email address is not used by the Mobiscroll registry
        email: "any@any.com",
        kind: "user",
        roles: [],
        date: httpdate_now(),
    };

    let response = client.put(&url).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(Error::AuthFailed(format!("HTTP {}: {}", status, detail)));
    }
    let body: AddUserResponse = response.json().await?;
    Ok(body.token)
}

/// Prompt for credentials, authenticate and persist the token. Returns the
/// username for the follow-up license lookup.
pub async fn login<P: Prompter>(client: &reqwest::Client, prompter: &P) -> Result<String> {
    let username = prompter.input("Mobiscroll email or user name:")?;
    let password = prompter.password("Mobiscroll password:")?;

    let token = register_user(client, &username, &password).await?;
    write_token(&npmrc_path(), &token)?;

    prompter.success(&format!("Logged in as {}", username.trim()));
    Ok(username.trim().to_string())
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn httpdate_now() -> String {
    // The registry only checks the field for presence, so epoch seconds do.
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{}", secs)
}
