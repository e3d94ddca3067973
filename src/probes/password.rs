//! Password hashing through `openssl passwd`.
//!
//! The clear-text password is written to the child's stdin, never passed as
//! an argument where `ps` could see it.

use super::PasswordHasher;
use crate::error::ProbeError;
use std::io::Write;
use std::process::{Command, Stdio};

/// SHA-512 crypt via `openssl passwd -6`
#[derive(Debug, Default, Clone, Copy)]
pub struct OpensslHasher;

impl OpensslHasher {
    fn passwd(&self, algorithm: &str, salt: Option<&str>, password: &str) -> Result<String, ProbeError> {
        let algorithm_flag = format!("-{}", algorithm);
        let mut args = vec![algorithm_flag.as_str(), "-stdin"];
        if let Some(salt) = salt {
            args.extend(["-salt", salt]);
        }

        let mut child = Command::new("openssl")
            .arg("passwd")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProbeError::Spawn {
                command: "openssl".to_string(),
                reason: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{}", password).map_err(|e| ProbeError::other(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ProbeError::other(e.to_string()))?;
        if !output.status.success() {
            return Err(ProbeError::Command {
                command: "openssl passwd".to_string(),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl PasswordHasher for OpensslHasher {
    fn hash(&self, password: &str) -> Result<String, ProbeError> {
        self.passwd("6", None, password)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ProbeError> {
        let Some((algorithm, salt)) = split_crypt_hash(hash) else {
            return Ok(false);
        };
        Ok(self.passwd(algorithm, Some(salt), password)? == hash)
    }
}

/// Split `$id$salt$digest` into the algorithm id and salt.
///
/// SHA-crypt hashes may carry a `rounds=N$` field ahead of the salt; it is
/// kept as part of the returned salt, which is the form `openssl passwd
/// -salt` accepts. Only the ids `openssl passwd` understands are returned.
pub fn split_crypt_hash(hash: &str) -> Option<(&str, &str)> {
    let rest = hash.strip_prefix('$')?;
    let (algorithm, rest) = rest.split_once('$')?;
    let (salt, _digest) = rest.rsplit_once('$')?;

    let plain_salt = match (algorithm, salt.split_once('$')) {
        ("5" | "6", Some((rounds, salt))) if rounds.starts_with("rounds=") => salt,
        (_, Some(_)) => return None,
        (_, None) => salt,
    };
    match algorithm {
        "1" | "5" | "6" if !plain_salt.is_empty() => Some((algorithm, salt)),
        _ => None,
    }
}

/// Look up `user`'s password hash in shadow file contents.
pub fn shadow_hash(shadow: &str, user: &str) -> Option<String> {
    shadow.lines().find_map(|line| {
        let mut fields = line.split(':');
        if fields.next()? != user {
            return None;
        }
        fields.next().map(str::to_string)
    })
}
