//! BLE transport boundary
//!
//! The connection manager only talks to the radio through these two traits.
//! [`BtleplugTransport`](super::platform::BtleplugTransport) is the real
//! implementation; tests use an in-memory fake.

use crate::domain::packet::TransportPayload;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Debug;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Btleplug(#[from] btleplug::Error),
    #[error("No Bluetooth adapter found")]
    NoAdapter,
    #[error("Characteristic {characteristic} not found in service {service}")]
    CharacteristicNotFound { service: Uuid, characteristic: Uuid },
    #[error("Invalid payload encoding: {0}")]
    Payload(#[from] base64::DecodeError),
    #[error("{0}")]
    Other(String),
}

/// One received advertisement.
#[derive(Debug, Clone)]
pub struct Advertisement<Id> {
    pub id: Id,
    pub address: String,
    pub local_name: Option<String>,
    pub rssi: Option<i16>,
}

pub type AdvertisementStream<Id> = BoxStream<'static, Result<Advertisement<Id>, TransportError>>;

#[async_trait]
pub trait BleTransport: Send + Sync + 'static {
    type DeviceId: Clone + Debug + Send + Sync + 'static;
    type Link: BleLink;

    /// Start an unfiltered scan and stream what the radio hears.
    async fn start_scan(&self) -> Result<AdvertisementStream<Self::DeviceId>, TransportError>;

    async fn stop_scan(&self) -> Result<(), TransportError>;

    async fn connect(&self, id: &Self::DeviceId) -> Result<Self::Link, TransportError>;
}

#[async_trait]
pub trait BleLink: Send + Sync + 'static {
    /// Discover every service and characteristic of the peripheral.
    async fn discover(&self) -> Result<(), TransportError>;

    async fn write_without_response(
        &self,
        service: Uuid,
        characteristic: Uuid,
        value: &TransportPayload,
    ) -> Result<(), TransportError>;

    /// Resolves once the peripheral is gone, whoever initiated it. Also
    /// resolves when the link was already down before the first poll.
    async fn disconnected(&self) -> Result<(), TransportError>;

    async fn disconnect(&self) -> Result<(), TransportError>;
}
