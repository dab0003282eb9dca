//! Message (de)serialization shared by the listeners and the upstream
//! solver.

use dns_proxy_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Classic DNS payload limit for UDP without EDNS(0).
pub const MIN_UDP_PAYLOAD: usize = 512;

/// Largest UDP payload the listeners ever emit.
pub const MAX_UDP_PAYLOAD: usize = 4096;

pub fn decode_message(bytes: &[u8]) -> Result<Message, DomainError> {
    Message::from_vec(bytes)
        .map_err(|e| DomainError::MalformedRequest(format!("Failed to decode DNS message: {}", e)))
}

/// Serializes `message`. With `compress` unset every name is written in
/// full; otherwise repeated suffixes become pointers.
pub fn encode_message(message: &Message, compress: bool) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(MIN_UDP_PAYLOAD);
    let mut encoder = BinEncoder::new(&mut buf);
    encoder.set_canonical_names(!compress);

    message.emit(&mut encoder).map_err(|e| {
        DomainError::InvalidDnsResponse(format!("Failed to serialize DNS message: {}", e))
    })?;

    Ok(buf)
}

/// UDP payload size the requester advertised, clamped to what the
/// listeners support.
pub fn udp_payload_limit(request: &Message) -> usize {
    request
        .extensions()
        .as_ref()
        .map(|edns| edns.max_payload() as usize)
        .unwrap_or(MIN_UDP_PAYLOAD)
        .clamp(MIN_UDP_PAYLOAD, MAX_UDP_PAYLOAD)
}

/// Encodes a UDP answer, dropping its record sections and setting TC when
/// it does not fit `limit`.
pub fn encode_for_udp(
    message: &Message,
    compress: bool,
    limit: usize,
) -> Result<Vec<u8>, DomainError> {
    let bytes = encode_message(message, compress)?;
    if bytes.len() <= limit {
        return Ok(bytes);
    }

    encode_message(&truncated(message), compress)
}

/// `message` with its record sections dropped and TC set, so the client
/// retries over TCP.
pub fn truncated(message: &Message) -> Message {
    let mut truncated = message.clone();
    truncated.take_answers();
    truncated.take_name_servers();
    truncated.take_additionals();
    truncated.set_truncated(true);
    truncated
}
