//! Builds upstream query messages in wire format using `hickory-proto`.

use crate::dns::wire::encode_message;
use dns_proxy_domain::{DomainError, Question};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};

pub struct MessageBuilder;

impl MessageBuilder {
    /// Builds a recursive query for `question` with a random transaction id.
    ///
    /// The record type is passed through as a raw code, so types without a
    /// mnemonic are forwarded unchanged.
    pub fn build_query(question: &Question) -> Result<(u16, Vec<u8>), DomainError> {
        let name = parse_name(&question.name)?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordType::from(question.record_type));
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);
        message.add_query(query);

        let bytes = encode_message(&message, true)?;
        Ok((id, bytes))
    }
}

/// Parses `name` as a fully qualified domain name.
pub fn parse_name(name: &str) -> Result<Name, DomainError> {
    let fqdn = if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    };

    Name::from_ascii(&fqdn)
        .map_err(|e| DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", name, e)))
}
