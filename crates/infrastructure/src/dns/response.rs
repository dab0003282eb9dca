//! Builds the answer messages the local solvers hand to the dispatcher.

use super::forwarding::message_builder::parse_name;
use dns_proxy_domain::{DomainError, Question};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, CNAME};
use hickory_proto::rr::{Name, RData, Record};
use std::net::IpAddr;

pub struct AnswerBuilder {
    owner: Name,
    message: Message,
}

impl AnswerBuilder {
    /// Starts an authoritative NOERROR answer whose records are owned by
    /// the question name.
    pub fn new(question: &Question) -> Result<Self, DomainError> {
        let owner = parse_name(&question.name)?;

        let mut message = Message::new();
        message
            .set_message_type(MessageType::Response)
            .set_authoritative(true)
            .set_recursion_available(true)
            .set_response_code(ResponseCode::NoError);

        Ok(Self { owner, message })
    }

    pub fn address(mut self, ip: IpAddr, ttl: u32) -> Self {
        let rdata = match ip {
            IpAddr::V4(v4) => RData::A(A(v4)),
            IpAddr::V6(v6) => RData::AAAA(AAAA(v6)),
        };
        self.message
            .add_answer(Record::from_rdata(self.owner.clone(), ttl, rdata));
        self
    }

    pub fn cname(mut self, target: &str, ttl: u32) -> Result<Self, DomainError> {
        let target = parse_name(target)?;
        self.message.add_answer(Record::from_rdata(
            self.owner.clone(),
            ttl,
            RData::CNAME(CNAME(target)),
        ));
        Ok(self)
    }

    /// Adds an address record owned by `owner` instead of the question
    /// name, as when following a CNAME.
    pub fn address_for(mut self, owner: &str, ip: IpAddr, ttl: u32) -> Result<Self, DomainError> {
        let owner = parse_name(owner)?;
        let rdata = match ip {
            IpAddr::V4(v4) => RData::A(A(v4)),
            IpAddr::V6(v6) => RData::AAAA(AAAA(v6)),
        };
        self.message.add_answer(Record::from_rdata(owner, ttl, rdata));
        Ok(self)
    }

    pub fn build(self) -> Message {
        self.message
    }
}
