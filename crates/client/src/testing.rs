use crate::fetch::{FetchMode, Network, NetworkError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use swcache_core::{InterceptedRequest, ResponseSnapshot};

/// Scripted network: canned responses by exact URL, 404 for anything else.
pub struct StubNetwork {
    online: AtomicBool,
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    log: Mutex<Vec<(String, String, FetchMode)>>,
}

impl StubNetwork {
    pub fn new() -> Self {
        Self { online: AtomicBool::new(true), responses: Mutex::default(), log: Mutex::default() }
    }

    pub fn offline() -> Self {
        let stub = Self::new();
        stub.set_online(false);
        stub
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn respond(&self, url: &str, response: ResponseSnapshot) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|(_, u, _)| u == url).count()
    }

    pub fn modes(&self) -> Vec<FetchMode> {
        self.log.lock().unwrap().iter().map(|(_, _, m)| *m).collect()
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &InterceptedRequest, mode: FetchMode) -> Result<ResponseSnapshot, NetworkError> {
        self.log
            .lock()
            .unwrap()
            .push((request.method.clone(), request.url.to_string(), mode));
        if !self.online.load(Ordering::SeqCst) {
            return Err(NetworkError::Offline);
        }
        let canned = self.responses.lock().unwrap().get(request.url.as_str()).cloned();
        Ok(canned.unwrap_or_else(|| ResponseSnapshot::new(404, "not found")))
    }
}
