//! Compact token codec
//!
//! Tokens are three dot-separated segments: header, payload and signature. Each
//! segment is base64 encoded on its own. The header and payload hold JSON
//! objects, the signature is an opaque byte string that is never verified.

use crate::{Error, Result};
use base64::{
    Engine as _,
    engine::GeneralPurpose,
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Literal required in the `typ` header field
pub const TOKEN_TYPE: &str = "JWT";

/// Algorithm advertised by locally minted tokens
pub const MOCK_ALGORITHM: &str = "HS256";

/// Decoded header or payload object
pub type Claims = Map<String, Value>;

/// Alphabets accepted on decode, tried in order
const DECODE_ENGINES: [GeneralPurpose; 4] = [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD];

/// Header written into minted tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: MOCK_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Payload written into minted access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name, the email address for password logins
    pub name: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration time (Unix seconds)
    pub exp: i64,
}

impl AccessClaims {
    /// Claims issued now and valid for `ttl_secs`
    pub fn new(sub: impl Into<String>, name: impl Into<String>, ttl_secs: i64) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: sub.into(),
            name: name.into(),
            iat,
            exp: iat + ttl_secs,
        }
    }
}

/// The encoded segments exactly as they appeared in the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegments {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// A structurally decoded token
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: Claims,
    pub payload: Claims,
    pub signature: Vec<u8>,
    pub raw: RawSegments,
}

impl DecodedToken {
    /// The `exp` claim, if present and numeric
    pub fn expires_at(&self) -> Option<i64> {
        numeric_claim(&self.payload, "exp")
    }

    /// The `iat` claim, if present and numeric
    pub fn issued_at(&self) -> Option<i64> {
        numeric_claim(&self.payload, "iat")
    }

    pub fn name(&self) -> Option<&str> {
        self.payload.get("name").and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.payload.get("sub").and_then(Value::as_str)
    }
}

fn numeric_claim(claims: &Claims, key: &str) -> Option<i64> {
    let value = claims.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
}

/// Encode a header, payload and signature into a compact token
pub fn encode<H, P>(header: &H, payload: &P, signature: &[u8]) -> Result<String>
where
    H: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    let header = STANDARD.encode(serde_json::to_vec(header)?);
    let payload = STANDARD.encode(serde_json::to_vec(payload)?);
    let signature = STANDARD.encode(signature);
    Ok(format!("{header}.{payload}.{signature}"))
}

/// Decode a compact token into its parts
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] when the token is empty or does not have
/// exactly three segments, and [`Error::Decode`] when a segment is not valid
/// base64 or the header/payload is not a JSON object.
pub fn decode(token: &str) -> Result<DecodedToken> {
    if token.is_empty() {
        return Err(Error::MalformedToken("Invalid token provided".to_string()));
    }

    let parts: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return Err(Error::MalformedToken(format!(
            "Expected 3 parts separated by dots, found {}",
            parts.len()
        )));
    };

    Ok(DecodedToken {
        header: decode_object(header, "header")?,
        payload: decode_object(payload, "payload")?,
        signature: decode_segment(signature, "signature")?,
        raw: RawSegments {
            header: (*header).to_string(),
            payload: (*payload).to_string(),
            signature: (*signature).to_string(),
        },
    })
}

fn decode_segment(segment: &str, part: &str) -> Result<Vec<u8>> {
    DECODE_ENGINES
        .iter()
        .find_map(|engine| engine.decode(segment).ok())
        .ok_or_else(|| Error::Decode(format!("{part} segment is not valid base64")))
}

fn decode_object(segment: &str, part: &str) -> Result<Claims> {
    let bytes = decode_segment(segment, part)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::Decode(format!("{part} is not a JSON object"))),
        Err(e) => Err(Error::Decode(format!("{part} is not valid JSON: {e}"))),
    }
}

/// Extract just the payload
pub fn payload(token: &str) -> Result<Claims> {
    decode(token).map(|decoded| decoded.payload)
}

/// Extract just the header
pub fn header(token: &str) -> Result<Claims> {
    decode(token).map(|decoded| decoded.header)
}

/// Whether the token has expired, treating undecodable tokens as expired
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

/// Same as [`is_expired`] against an explicit clock reading (Unix seconds)
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match decode(token) {
        Ok(decoded) => decoded.expires_at().is_some_and(|exp| exp < now),
        Err(e) => {
            debug!("Treating undecodable token as expired: {}", e);
            true
        }
    }
}

/// Seconds until expiry, `None` if the token never expires
///
/// Never negative. Undecodable tokens report `Some(0)`.
pub fn time_to_expiry(token: &str) -> Option<u64> {
    time_to_expiry_at(token, Utc::now().timestamp())
}

/// Same as [`time_to_expiry`] against an explicit clock reading (Unix seconds)
pub fn time_to_expiry_at(token: &str, now: i64) -> Option<u64> {
    match decode(token) {
        Ok(decoded) => decoded
            .expires_at()
            .map(|exp| u64::try_from(exp.saturating_sub(now)).unwrap_or(0)),
        Err(_) => Some(0),
    }
}

/// Outcome of a structural format check
#[derive(Debug, Clone, PartialEq)]
pub struct FormatValidation {
    pub valid: bool,
    pub reason: Option<String>,
    pub decoded: Option<DecodedToken>,
}

impl FormatValidation {
    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            decoded: None,
        }
    }
}

/// Check header and payload fields without looking at the signature
pub fn validate_format(token: &str) -> FormatValidation {
    let decoded = match decode(token) {
        Ok(decoded) => decoded,
        Err(e) => return FormatValidation::invalid(e.to_string()),
    };

    if !is_present(decoded.header.get("alg")) {
        return FormatValidation::invalid("Missing algorithm in header");
    }

    if decoded.header.get("typ").and_then(Value::as_str) != Some(TOKEN_TYPE) {
        return FormatValidation::invalid("Invalid or missing token type");
    }

    if !is_present(decoded.payload.get("iat")) {
        return FormatValidation::invalid("Missing issued at time");
    }

    FormatValidation {
        valid: true,
        reason: None,
        decoded: Some(decoded),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
