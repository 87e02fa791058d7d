//! btleplug-backed transport
//!
//! Works on every platform btleplug supports (BlueZ, WinRT, CoreBluetooth).

use crate::domain::packet::TransportPayload;
use crate::infrastructure::bluetooth::transport::{
    Advertisement, AdvertisementStream, BleLink, BleTransport, TransportError,
};
use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use tracing::{debug, info, trace};
use uuid::Uuid;

pub struct BtleplugTransport {
    adapter: Adapter,
}

impl BtleplugTransport {
    /// Open the first Bluetooth adapter of the host.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(TransportError::NoAdapter)?;

        match adapter.adapter_info().await {
            Ok(info_str) => info!("Using Bluetooth adapter: {}", info_str),
            Err(e) => debug!("Adapter info unavailable: {}", e),
        }

        Ok(Self { adapter })
    }
}

async fn advertisement(
    adapter: &Adapter,
    id: PeripheralId,
) -> Option<Result<Advertisement<PeripheralId>, TransportError>> {
    let peripheral = match adapter.peripheral(&id).await {
        Ok(p) => p,
        // Peripheral vanished between event and lookup
        Err(e) => {
            trace!("Skipping advertisement for {:?}: {}", id, e);
            return None;
        }
    };
    let properties = match peripheral.properties().await {
        Ok(props) => props,
        Err(e) => return Some(Err(e.into())),
    };
    let (local_name, rssi) = properties
        .map(|p| (p.local_name, p.rssi))
        .unwrap_or((None, None));

    Some(Ok(Advertisement {
        id,
        address: peripheral.address().to_string(),
        local_name,
        rssi,
    }))
}

#[async_trait]
impl BleTransport for BtleplugTransport {
    type DeviceId = PeripheralId;
    type Link = BtleplugLink;

    async fn start_scan(&self) -> Result<AdvertisementStream<PeripheralId>, TransportError> {
        // Subscribe first so nothing heard right after start is lost
        let events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;

        let adapter = self.adapter.clone();
        let stream = events.filter_map(move |event| {
            let adapter = adapter.clone();
            async move {
                match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
                        advertisement(&adapter, id).await
                    }
                    _ => None,
                }
            }
        });

        Ok(stream.boxed())
    }

    async fn stop_scan(&self) -> Result<(), TransportError> {
        self.adapter.stop_scan().await?;
        Ok(())
    }

    async fn connect(&self, id: &PeripheralId) -> Result<BtleplugLink, TransportError> {
        let peripheral = self.adapter.peripheral(id).await?;
        peripheral.connect().await?;
        Ok(BtleplugLink {
            adapter: self.adapter.clone(),
            peripheral,
        })
    }
}

pub struct BtleplugLink {
    adapter: Adapter,
    peripheral: Peripheral,
}

#[async_trait]
impl BleLink for BtleplugLink {
    async fn discover(&self) -> Result<(), TransportError> {
        self.peripheral.discover_services().await?;
        debug!(
            "Discovered {} characteristics",
            self.peripheral.characteristics().len()
        );
        Ok(())
    }

    async fn write_without_response(
        &self,
        service: Uuid,
        characteristic: Uuid,
        value: &TransportPayload,
    ) -> Result<(), TransportError> {
        let target = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == service && c.uuid == characteristic)
            .ok_or(TransportError::CharacteristicNotFound {
                service,
                characteristic,
            })?;

        let bytes = value.to_bytes()?;
        self.peripheral
            .write(&target, &bytes, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn disconnected(&self) -> Result<(), TransportError> {
        let id = self.peripheral.id();
        let mut events = self.adapter.events().await?;
        // A disconnect that happened before the subscription is not replayed
        if !self.peripheral.is_connected().await? {
            debug!("{:?} already disconnected", id);
            return Ok(());
        }
        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDisconnected(gone) = event {
                if gone == id {
                    return Ok(());
                }
            }
        }
        // Event stream closing means the adapter is gone, and the link with it
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}
