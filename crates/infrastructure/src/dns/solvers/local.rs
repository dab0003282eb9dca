use crate::dns::response::AnswerBuilder;
use async_trait::async_trait;
use dns_proxy_application::ports::{DnsSolver, HostnameRepository};
use dns_proxy_domain::{
    DomainError, HostnameEntry, HostnameRecordType, Question, RecordType, SolverId,
};
use hickory_proto::op::Message;
use std::sync::Arc;

/// Answers from hostnames configured through the admin API.
///
/// A/AAAA questions are answered from entries of that type. When the name
/// only has a CNAME, the alias is returned together with the target's
/// addresses if the target is itself a local hostname.
pub struct LocalSolver {
    repository: Arc<dyn HostnameRepository>,
}

impl LocalSolver {
    pub fn new(repository: Arc<dyn HostnameRepository>) -> Self {
        Self { repository }
    }

    fn follow_cname(
        &self,
        mut builder: AnswerBuilder,
        alias: &HostnameEntry,
        wanted: HostnameRecordType,
    ) -> Result<AnswerBuilder, DomainError> {
        builder = builder.cname(&alias.value, alias.ttl)?;

        let target = alias.value.trim_end_matches('.').to_ascii_lowercase();
        for entry in self.repository.lookup(&target) {
            if entry.record_type != wanted {
                continue;
            }
            if let Some(ip) = entry.ip() {
                builder = builder.address_for(&alias.value, ip, entry.ttl)?;
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl DnsSolver for LocalSolver {
    fn id(&self) -> SolverId {
        SolverId::Local
    }

    async fn solve(&self, question: &Question) -> Result<Message, DomainError> {
        let wanted = match question.known_type() {
            Some(RecordType::A) => HostnameRecordType::A,
            Some(RecordType::AAAA) => HostnameRecordType::AAAA,
            Some(RecordType::CNAME) => HostnameRecordType::CNAME,
            _ => return Err(DomainError::UnsupportedRecordType(question.type_name().into_owned())),
        };

        let hostname = question.hostname();
        let entries = self.repository.lookup(&hostname);
        let mut builder = AnswerBuilder::new(question)?;

        let direct: Vec<&HostnameEntry> =
            entries.iter().filter(|e| e.record_type == wanted).collect();
        if !direct.is_empty() {
            for entry in direct {
                builder = match entry.ip() {
                    Some(ip) => builder.address(ip, entry.ttl),
                    None => builder.cname(&entry.value, entry.ttl)?,
                };
            }
            return Ok(builder.build());
        }

        if let Some(alias) = entries
            .iter()
            .find(|e| e.record_type == HostnameRecordType::CNAME)
        {
            return Ok(self.follow_cname(builder, alias, wanted)?.build());
        }

        Err(DomainError::HostnameNotFound(hostname))
    }
}
