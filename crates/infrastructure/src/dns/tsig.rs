//! Transaction signatures (RFC 8945) for the listeners.
//!
//! Verification and MAC computation use the TSIG support of `hickory-proto`.
//! Answers are signed over exactly the bytes that go on the wire, so the
//! configured name compression holds for signed replies too.

use crate::dns::wire::{decode_message, encode_message};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use dns_proxy_domain::{DomainError, TsigKey};
use hickory_proto::error::{ProtoError, ProtoResult};
use hickory_proto::op::Message;
use hickory_proto::rr::dnssec::rdata::tsig::{make_tsig_record, TsigAlgorithm, TSIG};
use hickory_proto::rr::dnssec::rdata::DNSSECRData;
use hickory_proto::rr::dnssec::tsig::TSigner;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncoder;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Allowed clock skew between signer and verifier, in seconds.
pub const DEFAULT_FUDGE: u16 = 300;

/// TSIG error codes (RFC 8945 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsigError {
    BadSig,
    BadKey,
    BadTime,
}

impl TsigError {
    pub fn code(&self) -> u16 {
        match self {
            Self::BadSig => 16,
            Self::BadKey => 17,
            Self::BadTime => 18,
        }
    }
}

impl fmt::Display for TsigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BadSig => "BADSIG",
            Self::BadKey => "BADKEY",
            Self::BadTime => "BADTIME",
        })
    }
}

/// What the listener needs to sign the answer to a verified request.
#[derive(Clone)]
pub struct SigningContext {
    signer: TSigner,
    request_mac: Vec<u8>,
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("algorithm", self.signer.algorithm())
            .field("request_mac_len", &self.request_mac.len())
            .finish()
    }
}

/// Result of inspecting an inbound request. The decoded message never
/// carries the TSIG record.
#[derive(Debug)]
pub enum TsigCheck {
    Unsigned(Message),
    Verified {
        message: Message,
        context: SigningContext,
    },
    /// Signature present but not acceptable.
    Rejected { message: Message, error: TsigError },
}

pub struct TsigSigner {
    key_name: Name,
    key_bytes: Vec<u8>,
    fudge: u16,
}

impl TsigSigner {
    pub fn new(key: &TsigKey) -> Result<Self, DomainError> {
        let key_name = Name::from_ascii(&key.name).map_err(|e| {
            DomainError::TsigVerification(format!("Invalid key name {}: {}", key.name, e))
        })?;

        Ok(Self {
            key_name: key_name.to_lowercase(),
            key_bytes: decode_secret(&key.name, &key.secret),
            fudge: DEFAULT_FUDGE,
        })
    }

    pub fn key_name(&self) -> &Name {
        &self.key_name
    }

    /// A signer for `algorithm`, or `None` when hickory does not support it.
    fn signer_for(&self, algorithm: &TsigAlgorithm) -> Option<TSigner> {
        TSigner::new(
            self.key_bytes.clone(),
            algorithm.clone(),
            self.key_name.clone(),
            self.fudge,
        )
        .ok()
    }

    /// Decodes an inbound request and verifies its signature, if any.
    ///
    /// `Err` only for bytes that do not decode as a DNS message.
    pub fn check(&self, bytes: &[u8]) -> Result<TsigCheck, DomainError> {
        self.check_at(bytes, unix_now())
    }

    fn check_at(&self, bytes: &[u8], now: u64) -> Result<TsigCheck, DomainError> {
        let mut message = decode_message(bytes)?;
        let Some(record) = take_tsig(&mut message) else {
            return Ok(TsigCheck::Unsigned(message));
        };

        let signer = match tsig_data(&record) {
            Some(tsig) if record.name() == &self.key_name => self.signer_for(tsig.algorithm()),
            _ => None,
        };
        let Some(signer) = signer else {
            return Ok(TsigCheck::Rejected {
                message,
                error: TsigError::BadKey,
            });
        };

        let (request_mac, valid_window, _) = match signer.verify_message_byte(None, bytes, true) {
            Ok(verified) => verified,
            Err(_) => {
                return Ok(TsigCheck::Rejected {
                    message,
                    error: TsigError::BadSig,
                })
            }
        };
        if !valid_window.contains(&now) {
            return Ok(TsigCheck::Rejected {
                message,
                error: TsigError::BadTime,
            });
        }

        Ok(TsigCheck::Verified {
            message,
            context: SigningContext {
                signer,
                request_mac,
            },
        })
    }

    /// Encodes and signs the answer to a verified request.
    pub fn sign_response(
        &self,
        response: &Message,
        context: &SigningContext,
        compress: bool,
    ) -> Result<Vec<u8>, DomainError> {
        let unsigned = encode_message(response, compress)?;
        let pre_tsig = TSIG::new(
            context.signer.algorithm().clone(),
            unix_now(),
            self.fudge,
            Vec::new(),
            response.id(),
            0,
            Vec::new(),
        );

        let mac = mac_input(&context.request_mac, &unsigned, &pre_tsig, &self.key_name)
            .and_then(|tbs| context.signer.sign(&tbs))
            .map_err(|e: ProtoError| {
                DomainError::TsigVerification(format!("Failed to sign response: {}", e))
            })?;

        let mut signed = response.clone();
        signed.add_tsig(make_tsig_record(
            self.key_name.clone(),
            pre_tsig.set_mac(mac),
        ));
        encode_message(&signed, compress)
    }
}

/// Decodes a request and drops any signature unverified. Used when no key
/// is configured.
pub fn decode_unverified(bytes: &[u8]) -> Result<Message, DomainError> {
    let mut message = decode_message(bytes)?;
    message.take_signature();
    Ok(message)
}

fn take_tsig(message: &mut Message) -> Option<Record> {
    message
        .take_signature()
        .into_iter()
        .find(|record| record.record_type() == RecordType::TSIG)
}

fn tsig_data(record: &Record) -> Option<&TSIG> {
    match record.data() {
        Some(RData::DNSSEC(DNSSECRData::TSIG(tsig))) => Some(tsig),
        _ => None,
    }
}

/// Request MAC, the unsigned answer, then the TSIG variables.
fn mac_input(
    request_mac: &[u8],
    unsigned: &[u8],
    pre_tsig: &TSIG,
    key_name: &Name,
) -> ProtoResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(request_mac.len() + unsigned.len() + 96);
    {
        let mut encoder = BinEncoder::new(&mut buf);
        encoder.emit_u16(request_mac.len() as u16)?;
        encoder.emit_vec(request_mac)?;
        encoder.emit_vec(unsigned)?;
        pre_tsig.emit_tsig_for_mac(&mut encoder, key_name)?;
    }
    Ok(buf)
}

/// Secrets are base64 as configured. A value that is not valid base64 is
/// used as raw bytes.
fn decode_secret(key_name: &str, secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret)
        .or_else(|_| STANDARD_NO_PAD.decode(secret))
        .unwrap_or_else(|_| {
            warn!(key = %key_name, "TSIG secret is not base64, using it verbatim");
            secret.as_bytes().to_vec()
        })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
