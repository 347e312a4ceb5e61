//! # Derivation Paths
//!
//! Grammar: `( "//" hard | "/" soft )* [ "///" password ]`
//!
//! Junctions are non-empty and contain no `/`. The password is split off at
//! the first `///` and may contain anything, including `/`. It never appears
//! in the display form.

use super::errors::PathError;
use serde::{Deserialize, Serialize};
use shared_types::encode_str;
use std::fmt;
use zeroize::Zeroizing;

/// One derivation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Junction {
    /// `//name`: the child secret cannot be linked to the parent public key.
    Hard(String),
    /// `/name`: the child public key is derivable from the parent public key.
    Soft(String),
}

impl Junction {
    /// Junction text without separators.
    pub fn name(&self) -> &str {
        match self {
            Junction::Hard(name) | Junction::Soft(name) => name,
        }
    }

    /// Whether this is a hard junction.
    pub fn is_hard(&self) -> bool {
        matches!(self, Junction::Hard(_))
    }

    /// 32-byte chain code.
    ///
    /// Numeric junctions encode as little-endian `u64`, others as
    /// compact-length-prefixed UTF-8. Encodings over 32 bytes are hashed,
    /// shorter ones are zero-padded.
    pub fn chain_code(&self) -> [u8; 32] {
        let name = self.name();
        let encoded = match name.parse::<u64>() {
            Ok(number) => number.to_le_bytes().to_vec(),
            Err(_) => {
                let mut out = Vec::with_capacity(name.len() + 1);
                encode_str(name, &mut out);
                out
            }
        };
        if encoded.len() > 32 {
            return shared_crypto::blake3_hash(&encoded);
        }
        let mut code = [0u8; 32];
        code[..encoded.len()].copy_from_slice(&encoded);
        code
    }
}

impl fmt::Display for Junction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Junction::Hard(name) => write!(f, "//{name}"),
            Junction::Soft(name) => write!(f, "/{name}"),
        }
    }
}

/// Public part of a derivation path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationPath {
    /// Steps from the root secret.
    pub junctions: Vec<Junction>,
}

impl DerivationPath {
    /// Path without junctions.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether any junction is soft.
    pub fn has_soft(&self) -> bool {
        self.junctions.iter().any(|j| !j.is_hard())
    }

    /// Parse the junction part of a path (no password).
    pub fn parse_junctions(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        if !text.starts_with('/') {
            return Err(PathError::MissingSeparator(text.to_string()));
        }

        let mut junctions = Vec::new();
        let mut rest = text;
        let mut offset = 0;
        while !rest.is_empty() {
            let (hard, skip) = if rest.starts_with("//") { (true, 2) } else { (false, 1) };
            let body = &rest[skip..];
            let end = body.find('/').unwrap_or(body.len());
            if end == 0 {
                return Err(PathError::EmptyJunction(offset + skip));
            }
            let name = body[..end].to_string();
            junctions.push(if hard { Junction::Hard(name) } else { Junction::Soft(name) });
            offset += skip + end;
            rest = &body[end..];
        }
        Ok(Self { junctions })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for junction in &self.junctions {
            write!(f, "{junction}")?;
        }
        Ok(())
    }
}

/// A parsed path together with its optional password.
pub struct SecretPath {
    /// Junctions.
    pub path: DerivationPath,
    /// Password after `///`, wiped on drop.
    pub password: Option<Zeroizing<String>>,
}

impl SecretPath {
    /// Parse a full path as typed by the user.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let (junctions, password) = match text.find("///") {
            Some(at) => {
                let password = &text[at + 3..];
                if password.is_empty() {
                    return Err(PathError::EmptyPassword);
                }
                (&text[..at], Some(Zeroizing::new(password.to_string())))
            }
            None => (text, None),
        };
        Ok(Self {
            path: DerivationPath::parse_junctions(junctions)?,
            password,
        })
    }

    /// Whether a password was given.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl fmt::Debug for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPath")
            .field("path", &self.path.to_string())
            .field("has_password", &self.has_password())
            .finish()
    }
}
