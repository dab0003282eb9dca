#![allow(dead_code)]

use async_trait::async_trait;
use dns_proxy_application::ports::{
    ContainerEventSource, ContainerRegistry, DnsReply, DnsSolver, HostDnsConfigurator,
    HostnameRepository, ResponseWriter,
};
use dns_proxy_domain::{
    ContainerEvent, ContainerInfo, DomainError, HostnameEntry, Question, SolverId,
};
use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType as WireType};
use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn request(id: u16, name: &str, record_type: WireType) -> Message {
    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_recursion_desired(true);
    message.add_query(Query::query(Name::from_ascii(name).unwrap(), record_type));
    message
}

pub fn a_answer(name: &str, ip: Ipv4Addr, ttl: u32) -> Message {
    let mut message = Message::new();
    message.set_message_type(MessageType::Response);
    message.add_answer(Record::from_rdata(
        Name::from_ascii(name).unwrap(),
        ttl,
        RData::A(A(ip)),
    ));
    message
}

pub fn answered_ips(message: &Message) -> Vec<Ipv4Addr> {
    message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            Some(RData::A(A(ip))) => Some(*ip),
            _ => None,
        })
        .collect()
}

pub enum Behavior {
    Answer(Message),
    Fail,
    Panic,
}

pub struct MockSolver {
    id: SolverId,
    behavior: Mutex<HashMap<String, Behavior>>,
    default_fails: bool,
    calls: AtomicUsize,
}

impl MockSolver {
    /// Fails every question not explicitly configured.
    pub fn failing(id: SolverId) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Mutex::new(HashMap::new()),
            default_fails: true,
            calls: AtomicUsize::new(0),
        })
    }

    /// Answers every question not explicitly configured with an empty
    /// success.
    pub fn empty_success(id: SolverId) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior: Mutex::new(HashMap::new()),
            default_fails: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn on(self: &Arc<Self>, hostname: &str, behavior: Behavior) -> Arc<Self> {
        self.behavior
            .lock()
            .unwrap()
            .insert(hostname.to_string(), behavior);
        Arc::clone(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsSolver for MockSolver {
    fn id(&self) -> SolverId {
        self.id
    }

    async fn solve(&self, question: &Question) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let action = {
            let behavior = self.behavior.lock().unwrap();
            match behavior.get(&question.hostname()) {
                Some(Behavior::Answer(message)) => Behavior::Answer(message.clone()),
                Some(Behavior::Fail) => Behavior::Fail,
                Some(Behavior::Panic) => Behavior::Panic,
                None if self.default_fails => Behavior::Fail,
                None => {
                    let mut message = Message::new();
                    message.set_response_code(ResponseCode::NoError);
                    Behavior::Answer(message)
                }
            }
        };

        let outcome = match action {
            Behavior::Answer(message) => Ok(message),
            Behavior::Fail => Err(()),
            Behavior::Panic => panic!("solver blew up on {}", question.name),
        };

        outcome.map_err(|_| DomainError::HostnameNotFound(question.hostname()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingWriter {
    pub replies: Arc<Mutex<Vec<DnsReply>>>,
    pub fail: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn replies(&self) -> Vec<DnsReply> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseWriter for RecordingWriter {
    async fn write_reply(self, reply: DnsReply) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::IoError("connection reset".to_string()));
        }
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockHostDns {
    pub applies: AtomicUsize,
    pub restores: AtomicUsize,
    pub fail_apply: AtomicBool,
    pub fail_restore: AtomicBool,
    pub restore_delay_ms: AtomicU64,
    /// Set while an apply or restore is running.
    busy: AtomicBool,
    pub overlapped: AtomicBool,
}

impl MockHostDns {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn applies(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn restores(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
    }

    fn leave(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl HostDnsConfigurator for MockHostDns {
    fn apply(&self) -> Result<(), DomainError> {
        self.enter();
        std::thread::sleep(std::time::Duration::from_millis(5));
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.leave();
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(DomainError::HostDnsConfig("read-only file system".to_string()));
        }
        Ok(())
    }

    fn restore(&self) -> Result<(), DomainError> {
        self.enter();
        let delay = self.restore_delay_ms.load(Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(delay));
        self.restores.fetch_add(1, Ordering::SeqCst);
        self.leave();
        if self.fail_restore.load(Ordering::SeqCst) {
            return Err(DomainError::HostDnsConfig("permission denied".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRegistry {
    containers: Mutex<HashMap<String, ContainerInfo>>,
}

impl InMemoryRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ContainerRegistry for InMemoryRegistry {
    fn upsert(&self, container: ContainerInfo) {
        self.containers
            .lock()
            .unwrap()
            .insert(container.id.clone(), container);
    }

    fn remove(&self, id: &str) -> Option<ContainerInfo> {
        self.containers.lock().unwrap().remove(id)
    }

    fn lookup(&self, hostname: &str) -> Option<Vec<IpAddr>> {
        self.containers
            .lock()
            .unwrap()
            .values()
            .find(|c| c.hostnames.iter().any(|h| h == hostname))
            .map(|c| c.addresses.clone())
    }

    fn list(&self) -> Vec<ContainerInfo> {
        self.containers.lock().unwrap().values().cloned().collect()
    }
}

pub struct ScriptedEvents {
    pub snapshot: Vec<ContainerInfo>,
    pub events: VecDeque<Result<ContainerEvent, DomainError>>,
}

#[async_trait]
impl ContainerEventSource for ScriptedEvents {
    async fn snapshot(&mut self) -> Result<Vec<ContainerInfo>, DomainError> {
        Ok(std::mem::take(&mut self.snapshot))
    }

    async fn next_event(&mut self) -> Result<Option<ContainerEvent>, DomainError> {
        self.events.pop_front().transpose()
    }
}

#[derive(Default)]
pub struct InMemoryHostnames {
    entries: std::sync::RwLock<Vec<HostnameEntry>>,
    next_id: AtomicUsize,
}

impl InMemoryHostnames {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Default::default(),
            next_id: AtomicUsize::new(1),
        })
    }
}

#[async_trait]
impl HostnameRepository for InMemoryHostnames {
    fn lookup(&self, hostname: &str) -> Vec<HostnameEntry> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.matches(hostname).is_some())
            .cloned()
            .collect()
    }

    fn list(&self) -> Vec<HostnameEntry> {
        self.entries.read().unwrap().clone()
    }

    async fn create(&self, mut entry: HostnameEntry) -> Result<HostnameEntry, DomainError> {
        let mut entries = self.entries.write().unwrap();
        if entries
            .iter()
            .any(|e| e.hostname == entry.hostname && e.record_type == entry.record_type)
        {
            return Err(DomainError::HostnameAlreadyExists(entry.hostname.clone()));
        }
        entry.id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: u64, mut entry: HostnameEntry) -> Result<HostnameEntry, DomainError> {
        let mut entries = self.entries.write().unwrap();
        let slot = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("hostname {}", id)))?;
        entry.id = id;
        *slot = entry.clone();
        Ok(entry)
    }

    async fn delete(&self, id: u64) -> Result<HostnameEntry, DomainError> {
        let mut entries = self.entries.write().unwrap();
        let index = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("hostname {}", id)))?;
        Ok(entries.remove(index))
    }
}
