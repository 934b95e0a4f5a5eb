use anyhow::Result;
use async_trait::async_trait;
use conductor::config::{Config, ConfigError, ConfigSource};
use conductor::pipeline::{CollectRequest, EnrichRequest, PipelineExecutor};
use conductor::storage::StoreProbe;
use conductor::{AccessError, StoreKind};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Records every call; targets containing "fail" return an error
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, String, String)>>,
    pub studies: Mutex<usize>,
    pub aliases: Mutex<usize>,
    cancel_on_collect: Option<CancellationToken>,
}

impl RecordingExecutor {
    /// Cancels `token` from inside every collect call
    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_collect: Some(token),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls().into_iter().map(|(op, _, _)| op).collect()
    }

    fn record(&self, operation: &str, backend: &str, target: &str) -> Result<()> {
        self.calls.lock().unwrap().push((
            operation.to_string(),
            backend.to_string(),
            target.to_string(),
        ));
        if target.contains("fail") {
            anyhow::bail!("simulated failure for {}", target);
        }
        Ok(())
    }
}

#[async_trait]
impl PipelineExecutor for RecordingExecutor {
    async fn collect(&self, request: &CollectRequest) -> Result<()> {
        if let Some(token) = &self.cancel_on_collect {
            token.cancel();
        }
        self.record("collect", &request.backend, &request.target)
    }

    async fn enrich(&self, request: &EnrichRequest) -> Result<()> {
        let operation = if request.only_identities {
            "identities"
        } else {
            "enrich"
        };
        let target = request.params.join(" ");
        self.record(operation, &request.backend, &target)
    }

    async fn run_studies(&self, _config: &Config) -> Result<()> {
        *self.studies.lock().unwrap() += 1;
        Ok(())
    }

    async fn update_aliases(&self, _config: &Config) -> Result<()> {
        *self.aliases.lock().unwrap() += 1;
        Ok(())
    }
}

/// Answers probes from a fixed status per store
pub struct FakeProbe {
    pub collection_status: u16,
    pub enrichment_status: u16,
    pub probed: Mutex<Vec<StoreKind>>,
}

impl FakeProbe {
    pub fn healthy() -> Self {
        Self::with_status(200, 200)
    }

    pub fn with_status(collection_status: u16, enrichment_status: u16) -> Self {
        Self {
            collection_status,
            enrichment_status,
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<StoreKind> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreProbe for FakeProbe {
    async fn probe(&self, store: StoreKind, url: &str) -> Result<(), AccessError> {
        self.probed.lock().unwrap().push(store);
        let status = match store {
            StoreKind::Collection => self.collection_status,
            StoreKind::Enrichment => self.enrichment_status,
        };
        if status == 200 {
            Ok(())
        } else {
            Err(AccessError::UnexpectedStatus {
                store,
                url: url.to_string(),
                status,
            })
        }
    }
}

/// Hands out queued results, repeating the last one when the queue runs dry
pub struct SequenceSource {
    queue: Mutex<VecDeque<Result<Config, String>>>,
    last: Mutex<Option<Config>>,
}

impl SequenceSource {
    pub fn new(items: Vec<Result<Config, String>>) -> Self {
        Self {
            queue: Mutex::new(items.into()),
            last: Mutex::new(None),
        }
    }
}

impl ConfigSource for SequenceSource {
    fn load(&self) -> Result<Config, ConfigError> {
        let next = self.queue.lock().unwrap().pop_front();
        match next {
            Some(Ok(config)) => {
                *self.last.lock().unwrap() = Some(config.clone());
                Ok(config)
            }
            Some(Err(message)) => Err(ConfigError::ValidationFailed(message)),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ConfigError::ValidationFailed("no configuration".to_string())),
        }
    }
}
