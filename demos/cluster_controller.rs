//! End-to-end demo against an in-memory directory: register two providers,
//! keep them fresh, arbitrate a proxy binding, then deregister one provider.
//!
//! Run with: `cargo run --example cluster_controller --features logging`

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use provisor::{
    ArbitrationListener, Arbitrator, Bus, CallError, DirectoryClient, DirectoryConfig,
    DirectoryProxy, Discovery, DiscoveryEntry, DiscoveryError, DiscoveryQos,
    GlobalDiscoveryEntry, LogWriter, MessagingQos, ProviderQos, RuntimeError, SubscriberSet,
    Version,
};

/// The whole "global backend" in one process: a map of registrations that
/// serves both as the directory proxy and as the discovery backend.
struct InMemoryDirectory {
    entries: Mutex<HashMap<String, GlobalDiscoveryEntry>>,
}

impl InMemoryDirectory {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
        })
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[async_trait]
impl DirectoryProxy for InMemoryDirectory {
    async fn add(
        &self,
        entry: GlobalDiscoveryEntry,
        _gbids: Vec<String>,
        _qos: MessagingQos,
    ) -> Result<(), CallError> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.participant_id().to_string(), entry);
        Ok(())
    }

    async fn remove(
        &self,
        participant_id: String,
        _gbids: Vec<String>,
        _qos: MessagingQos,
    ) -> Result<(), CallError> {
        match self.entries.lock().unwrap().remove(&participant_id) {
            Some(_) => Ok(()),
            None => Err(CallError::Rejected(DiscoveryError::NoEntryForParticipant)),
        }
    }

    async fn lookup_domains(
        &self,
        domains: Vec<String>,
        interface_name: String,
        _gbids: Vec<String>,
        _qos: MessagingQos,
    ) -> Result<Vec<GlobalDiscoveryEntry>, CallError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| domains.contains(&e.entry.domain) && e.entry.interface_name == interface_name)
            .cloned()
            .collect())
    }

    async fn lookup_participant(
        &self,
        participant_id: String,
        _gbids: Vec<String>,
        _qos: MessagingQos,
    ) -> Result<GlobalDiscoveryEntry, CallError> {
        self.entries
            .lock()
            .unwrap()
            .get(&participant_id)
            .cloned()
            .ok_or(CallError::Rejected(DiscoveryError::NoEntryForParticipant))
    }

    async fn touch(
        &self,
        _cluster_controller_id: String,
        participant_ids: Vec<String>,
        _qos: MessagingQos,
    ) -> Result<(), RuntimeError> {
        let mut entries = self.entries.lock().unwrap();
        for id in participant_ids {
            if let Some(e) = entries.get_mut(&id) {
                e.entry.last_seen_ms = now_ms();
            }
        }
        Ok(())
    }

    async fn remove_stale(
        &self,
        _cluster_controller_id: String,
        max_last_seen_ms: i64,
        _qos: MessagingQos,
    ) -> Result<(), RuntimeError> {
        self.entries
            .lock()
            .unwrap()
            .retain(|_, e| e.entry.last_seen_ms >= max_last_seen_ms);
        Ok(())
    }
}

#[async_trait]
impl Discovery for InMemoryDirectory {
    async fn lookup(
        &self,
        domains: &[String],
        interface_name: &str,
        _qos: &DiscoveryQos,
    ) -> Result<Vec<DiscoveryEntry>, CallError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| {
                domains.contains(&e.entry.domain) && e.entry.interface_name == interface_name
            })
            .map(|e| e.entry.clone())
            .collect())
    }
}

struct PrintListener;

impl ArbitrationListener for PrintListener {
    fn on_provider_selected(&self, participant_id: &str) {
        println!(">>> proxy bound to provider {participant_id}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let bus = Bus::default();
    let subscribers = Arc::new(SubscriberSet::new(vec![Arc::new(LogWriter::new())]));
    let _listener = subscribers.listen(&bus);

    let directory = InMemoryDirectory::new();
    let client = DirectoryClient::new(DirectoryConfig::default(), bus.clone());
    client.set_proxy(directory.clone());

    // Register two providers of the same interface with different priorities.
    for (id, priority) in [("radio-main", 5), ("radio-backup", 1)] {
        let entry = DiscoveryEntry::new(
            id,
            "vehicle",
            "vehicle/Radio",
            Version::new(1, 0),
            ProviderQos::default().with_priority(priority),
        );
        client
            .add(
                GlobalDiscoveryEntry::from_local(entry, "inproc://demo-node"),
                vec!["backend-a".into()],
            )
            .await
            .expect("registration failed");
    }

    // Keepalive for both registrations.
    client
        .touch(
            "demo-cc",
            vec!["radio-main".into(), "radio-backup".into()],
            "backend-a",
        )
        .await
        .expect("touch failed");

    // Arbitrate: the QoS policy picks the highest priority.
    let mut arbitrator = Arbitrator::new(
        vec!["vehicle".into()],
        "vehicle/Radio",
        Version::new(1, 0),
        directory.clone(),
        DiscoveryQos::default(),
        Arc::new(PrintListener),
        bus.clone(),
    );
    match arbitrator.attempt_arbitration().await {
        Ok(winner) => println!(">>> arbitration winner: {winner}"),
        Err(e) => eprintln!(">>> arbitration failed: {e}"),
    }

    // Deregister the backup provider.
    client
        .remove("radio-backup", vec!["backend-a".into()])
        .await
        .expect("deregistration failed");

    // Let the log subscriber drain before exiting.
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.shutdown();
}
