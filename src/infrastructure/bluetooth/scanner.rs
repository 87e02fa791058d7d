//! BLE Scanner Module
//!
//! Finds the first advertisement whose name satisfies the device filter.

use crate::domain::models::DeviceNameFilter;
use crate::infrastructure::bluetooth::transport::{
    Advertisement, AdvertisementStream, BleTransport, TransportError,
};
use futures::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a scan ended.
#[derive(Debug)]
pub enum ScanOutcome<Id> {
    Found(Advertisement<Id>),
    TimedOut,
    Cancelled,
}

/// Scan until the first match, the timeout or cancellation.
///
/// The scan is stopped on every exit path once it was started. Advertisements
/// are pulled one at a time, so a second match can never be acted upon.
pub async fn scan_for_device<T: BleTransport>(
    transport: &T,
    filter: &DeviceNameFilter,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ScanOutcome<T::DeviceId>, TransportError> {
    info!(
        "Starting BLE scan for '{}' ({:?} match, {:?} timeout)",
        filter.pattern, filter.kind, timeout
    );
    let advertisements = transport.start_scan().await?;

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Ok(ScanOutcome::Cancelled),
        found = tokio::time::timeout(timeout, first_match(advertisements, filter)) => match found {
            Ok(Ok(Some(adv))) => Ok(ScanOutcome::Found(adv)),
            // Stream ended without a match: radio stopped reporting
            Ok(Ok(None)) => Ok(ScanOutcome::TimedOut),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(ScanOutcome::TimedOut),
        },
    };

    info!("Stopping BLE scan...");
    if let Err(e) = transport.stop_scan().await {
        warn!("Failed to stop scan: {}", e);
    }

    outcome
}

async fn first_match<Id>(
    mut advertisements: AdvertisementStream<Id>,
    filter: &DeviceNameFilter,
) -> Result<Option<Advertisement<Id>>, TransportError> {
    while let Some(adv) = advertisements.next().await {
        let adv = adv?;
        if filter.matches(adv.local_name.as_deref()) {
            info!(
                "Found {} at {} ({:?} dBm)",
                adv.local_name.as_deref().unwrap_or_default(),
                adv.address,
                adv.rssi
            );
            return Ok(Some(adv));
        }
        debug!("Ignoring {:?} at {}", adv.local_name, adv.address);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::NameMatch;
    use crate::infrastructure::bluetooth::fake::FakeTransport;

    fn jake() -> DeviceNameFilter {
        DeviceNameFilter::new("Jake", NameMatch::Contains)
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let transport = FakeTransport::new();
        transport.advertise("AA", Some("Headphones"));
        transport.advertise("BB", None);
        transport.advertise("CC", Some("Jake LED"));
        transport.advertise("DD", Some("Jake LED 2"));

        let outcome = scan_for_device(
            &transport,
            &jake(),
            Duration::from_secs(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        match outcome {
            ScanOutcome::Found(adv) => assert_eq!(adv.id, "CC"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(transport.stop_scan_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_match() {
        let transport = FakeTransport::new();
        transport.advertise("AA", Some("Keyboard"));

        let outcome = scan_for_device(
            &transport,
            &jake(),
            Duration::from_millis(10_000),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, ScanOutcome::TimedOut));
        assert_eq!(transport.stop_scan_calls(), 1);
    }

    #[tokio::test]
    async fn test_cancelled() {
        let transport = FakeTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = scan_for_device(&transport, &jake(), Duration::from_secs(10), &cancel)
            .await
            .unwrap();

        assert!(matches!(outcome, ScanOutcome::Cancelled));
        assert_eq!(transport.stop_scan_calls(), 1);
    }

    #[tokio::test]
    async fn test_scan_error_still_stops() {
        let transport = FakeTransport::new();
        transport.advertise_error("adapter powered off");

        let err = scan_for_device(
            &transport,
            &jake(),
            Duration::from_secs(10),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "adapter powered off");
        assert_eq!(transport.stop_scan_calls(), 1);
    }
}
