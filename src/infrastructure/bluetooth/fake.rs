//! In-memory transport for tests.

use crate::domain::packet::TransportPayload;
use crate::infrastructure::bluetooth::transport::{
    Advertisement, AdvertisementStream, BleLink, BleTransport, TransportError,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use uuid::Uuid;

type AdResult = Result<Advertisement<String>, TransportError>;

#[derive(Default)]
struct Script {
    connect_error: Option<String>,
    discover_error: Option<String>,
    write_error: Option<String>,
    connect_hangs: bool,
}

struct State {
    queued: Vec<AdResult>,
    stop_scan_calls: usize,
    connects: Vec<String>,
    links: Vec<FakeLink>,
    script: Script,
}

/// Scripted transport. Advertisements queued with [`advertise`](Self::advertise)
/// are delivered in order by the next scan, which then stays silent until
/// stopped.
#[derive(Clone)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                queued: Vec::new(),
                stop_scan_calls: 0,
                connects: Vec::new(),
                links: Vec::new(),
                script: Script::default(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn advertise(&self, id: &str, name: Option<&str>) {
        let adv = Advertisement {
            id: id.to_string(),
            address: id.to_string(),
            local_name: name.map(str::to_string),
            rssi: Some(-60),
        };
        self.lock().queued.push(Ok(adv));
    }

    pub fn advertise_error(&self, message: &str) {
        self.lock()
            .queued
            .push(Err(TransportError::Other(message.to_string())));
    }

    pub fn fail_connect(&self, message: &str) {
        self.lock().script.connect_error = Some(message.to_string());
    }

    pub fn fail_discover(&self, message: &str) {
        self.lock().script.discover_error = Some(message.to_string());
    }

    pub fn fail_write(&self, message: &str) {
        self.lock().script.write_error = Some(message.to_string());
    }

    pub fn hang_connect(&self) {
        self.lock().script.connect_hangs = true;
    }

    pub fn stop_scan_calls(&self) -> usize {
        self.lock().stop_scan_calls
    }

    pub fn connects(&self) -> Vec<String> {
        self.lock().connects.clone()
    }

    /// Most recent link handed out by `connect`.
    pub fn last_link(&self) -> Option<FakeLink> {
        self.lock().links.last().cloned()
    }
}

#[async_trait]
impl BleTransport for FakeTransport {
    type DeviceId = String;
    type Link = FakeLink;

    async fn start_scan(&self) -> Result<AdvertisementStream<String>, TransportError> {
        let queued = std::mem::take(&mut self.lock().queued);
        Ok(futures::stream::iter(queued)
            .chain(futures::stream::pending())
            .boxed())
    }

    async fn stop_scan(&self) -> Result<(), TransportError> {
        self.lock().stop_scan_calls += 1;
        Ok(())
    }

    async fn connect(&self, id: &String) -> Result<FakeLink, TransportError> {
        let (hangs, error, discover_error, write_error) = {
            let mut state = self.lock();
            state.connects.push(id.clone());
            (
                state.script.connect_hangs,
                state.script.connect_error.clone(),
                state.script.discover_error.clone(),
                state.script.write_error.clone(),
            )
        };
        if hangs {
            futures::future::pending::<()>().await;
        }
        if let Some(message) = error {
            return Err(TransportError::Other(message));
        }

        let link = FakeLink::new(discover_error, write_error);
        self.lock().links.push(link.clone());
        Ok(link)
    }
}

struct LinkState {
    writes: Mutex<Vec<(Uuid, Uuid, String)>>,
    disconnect_calls: Mutex<usize>,
    gone: watch::Sender<bool>,
    discover_error: Option<String>,
    write_error: Option<String>,
}

#[derive(Clone)]
pub struct FakeLink {
    state: Arc<LinkState>,
}

impl FakeLink {
    fn new(discover_error: Option<String>, write_error: Option<String>) -> Self {
        let (gone, _) = watch::channel(false);
        Self {
            state: Arc::new(LinkState {
                writes: Mutex::new(Vec::new()),
                disconnect_calls: Mutex::new(0),
                gone,
                discover_error,
                write_error,
            }),
        }
    }

    /// Simulate the peripheral going away on its own.
    pub fn drop_connection(&self) {
        self.state.gone.send_replace(true);
    }

    pub fn writes(&self) -> Vec<(Uuid, Uuid, String)> {
        self.state.writes.lock().unwrap().clone()
    }

    pub fn disconnect_calls(&self) -> usize {
        *self.state.disconnect_calls.lock().unwrap()
    }
}

#[async_trait]
impl BleLink for FakeLink {
    async fn discover(&self) -> Result<(), TransportError> {
        match &self.state.discover_error {
            Some(message) => Err(TransportError::Other(message.clone())),
            None => Ok(()),
        }
    }

    async fn write_without_response(
        &self,
        service: Uuid,
        characteristic: Uuid,
        value: &TransportPayload,
    ) -> Result<(), TransportError> {
        if let Some(message) = &self.state.write_error {
            return Err(TransportError::Other(message.clone()));
        }
        self.state
            .writes
            .lock()
            .unwrap()
            .push((service, characteristic, value.as_str().to_string()));
        Ok(())
    }

    async fn disconnected(&self) -> Result<(), TransportError> {
        let mut gone = self.state.gone.subscribe();
        let _ = gone.wait_for(|gone| *gone).await;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        *self.state.disconnect_calls.lock().unwrap() += 1;
        self.state.gone.send_replace(true);
        Ok(())
    }
}
