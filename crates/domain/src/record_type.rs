use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Record types the proxy knows by name. Anything else still flows through
/// the chain as a raw code, see [`crate::Question`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    PTR,
    SRV,
    SOA,
    NS,
    CAA,
    SVCB,
    HTTPS,
    ANY,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::PTR => "PTR",
            RecordType::SRV => "SRV",
            RecordType::SOA => "SOA",
            RecordType::NS => "NS",
            RecordType::CAA => "CAA",
            RecordType::SVCB => "SVCB",
            RecordType::HTTPS => "HTTPS",
            RecordType::ANY => "ANY",
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::SRV => 33,
            RecordType::SVCB => 64,
            RecordType::HTTPS => 65,
            RecordType::ANY => 255,
            RecordType::CAA => 257,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            28 => Some(RecordType::AAAA),
            33 => Some(RecordType::SRV),
            64 => Some(RecordType::SVCB),
            65 => Some(RecordType::HTTPS),
            255 => Some(RecordType::ANY),
            257 => Some(RecordType::CAA),
            _ => None,
        }
    }

    /// Mnemonic for a raw type code, `TYPE<n>` (RFC 3597) when unknown.
    pub fn code_to_name(code: u16) -> Cow<'static, str> {
        match Self::from_u16(code) {
            Some(rt) => Cow::Borrowed(rt.as_str()),
            None => Cow::Owned(format!("TYPE{}", code)),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            "CNAME" => Ok(RecordType::CNAME),
            "MX" => Ok(RecordType::MX),
            "TXT" => Ok(RecordType::TXT),
            "PTR" => Ok(RecordType::PTR),
            "SRV" => Ok(RecordType::SRV),
            "SOA" => Ok(RecordType::SOA),
            "NS" => Ok(RecordType::NS),
            "CAA" => Ok(RecordType::CAA),
            "SVCB" => Ok(RecordType::SVCB),
            "HTTPS" => Ok(RecordType::HTTPS),
            "ANY" => Ok(RecordType::ANY),
            _ => Err(format!("Unknown record type: {}", s)),
        }
    }
}
