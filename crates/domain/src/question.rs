use super::RecordType;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The name + record type pair a client asks about.
///
/// `name` is kept exactly as it appeared on the wire (fully qualified, with
/// the trailing dot). `record_type` is the raw type code so that types the
/// proxy has no mnemonic for can still be forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub name: Arc<str>,
    pub record_type: u16,
}

impl Question {
    pub fn new(name: impl Into<Arc<str>>, record_type: u16) -> Self {
        Self {
            name: name.into(),
            record_type,
        }
    }

    /// Lowercased name without the trailing root dot, the key used by the
    /// container cache and the hostname store.
    pub fn hostname(&self) -> String {
        self.name.trim_end_matches('.').to_ascii_lowercase()
    }

    pub fn known_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.record_type)
    }

    pub fn type_name(&self) -> Cow<'static, str> {
        RecordType::code_to_name(self.record_type)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_name())
    }
}
