//! [`Transport`] over Bluetooth Low Energy.
//!
//! JBD boards expose a UART-like GATT service: commands are written to one
//! characteristic and the reply arrives as notifications on another, split
//! over several notification events.

use anyhow::anyhow;
use bluest::Adapter;
use bluest::Characteristic;
use bluest::Device;
use bluest::Uuid;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio::time::Duration;

use crate::error::TransportError;
use crate::transport::Transport;

const JBD_SERVICE_ID: Uuid = Uuid::from_u128(0x0000ff00_0000_1000_8000_00805f9b34fb);
const JBD_NOTIFY_CHARACTERISTIC_ID: Uuid = Uuid::from_u128(0x0000ff01_0000_1000_8000_00805f9b34fb);
const JBD_WRITE_CHARACTERISTIC_ID: Uuid = Uuid::from_u128(0x0000ff02_0000_1000_8000_00805f9b34fb);

type Notification = Result<Vec<u8>, TransportError>;

/// A connected device together with its notification subscription.
struct Session {
    device: Device,
    write: Characteristic,
    notifications: mpsc::UnboundedReceiver<Notification>,
    forwarder: JoinHandle<()>,
}

pub struct BleTransport {
    adapter: Option<Adapter>,
    device: Option<Device>,
    session: Option<Session>,
    discovery_timeout: Duration,
}

impl Default for BleTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(Self::DEFAULT_DISCOVERY_TIMEOUT_S))
    }
}

impl BleTransport {
    // How long a scan may run looking for the device before the connect attempt fails
    const DEFAULT_DISCOVERY_TIMEOUT_S: u64 = 10;

    pub fn new(discovery_timeout: Duration) -> Self {
        Self {
            adapter: None,
            device: None,
            session: None,
            discovery_timeout,
        }
    }

    async fn adapter(&mut self) -> anyhow::Result<Adapter> {
        if let Some(adapter) = &self.adapter {
            return Ok(adapter.clone());
        }
        let adapter = Adapter::default()
            .await
            .ok_or(anyhow!("Default adapter not found"))?;
        adapter.wait_available().await?;
        self.adapter = Some(adapter.clone());
        Ok(adapter)
    }

    /// Scan until a device matching `address` advertises. The result is kept so
    /// that later connect attempts skip the scan.
    async fn device(&mut self, address: &str, adapter: &Adapter) -> Result<Device, TransportError> {
        if let Some(device) = &self.device {
            return Ok(device.clone());
        }
        let device = timeout(self.discovery_timeout, discover_device(address, adapter))
            .await
            .map_err(|_| TransportError::DeviceNotFound(address.to_string()))??;
        self.device = Some(device.clone());
        Ok(device)
    }

    async fn open_session(device: Device) -> anyhow::Result<Session> {
        let service = device
            .discover_services_with_uuid(JBD_SERVICE_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the JBD UART service."))?
            .clone();
        let write = service
            .discover_characteristics_with_uuid(JBD_WRITE_CHARACTERISTIC_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the JBD write characteristic."))?
            .clone();
        let notify = service
            .discover_characteristics_with_uuid(JBD_NOTIFY_CHARACTERISTIC_ID)
            .await?
            .first()
            .ok_or(anyhow!("The specified device does not support the JBD notify characteristic."))?
            .clone();

        let (notifications, forwarder) = subscribe(notify).await?;

        Ok(Session {
            device,
            write,
            notifications,
            forwarder,
        })
    }

    fn session(&mut self) -> Result<&mut Session, TransportError> {
        self.session.as_mut().ok_or(TransportError::NotConnected)
    }
}

impl Transport for BleTransport {
    async fn connect(&mut self, address: &str, connect_timeout: Duration) -> Result<(), TransportError> {
        if self.session.is_some() {
            return Ok(());
        }
        let adapter = self.adapter().await?;
        let device = self.device(address, &adapter).await?;

        if !device.is_connected().await {
            timeout(connect_timeout, adapter.connect_device(&device))
                .await
                .map_err(|_| TransportError::Timeout)??;
        }

        let session = timeout(connect_timeout, Self::open_session(device))
            .await
            .map_err(|_| TransportError::Timeout)??;
        self.session = Some(session);
        Ok(())
    }

    /// Write a command. Notifications left over from an earlier request are
    /// dropped first so they cannot be mistaken for the reply.
    async fn send_command(&mut self, command: &[u8]) -> Result<(), TransportError> {
        let session = self.session()?;
        while let Ok(stale) = session.notifications.try_recv() {
            if let Ok(data) = stale {
                tracing::trace!("BMS: dropping stale notification: 0x{}", hex::encode(data));
            }
        }
        tracing::trace!("BMS: TX: {}", hex::encode(command));
        session.write.write(command).await?;
        Ok(())
    }

    async fn receive_chunk(&mut self, chunk_timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let session = self.session()?;
        match timeout(chunk_timeout, session.notifications.recv()).await {
            Err(_) => Err(TransportError::Timeout),
            Ok(None) => Err(TransportError::EndOfStream),
            Ok(Some(notification)) => {
                let data = notification?;
                tracing::trace!("BMS: RX notification: 0x{}", hex::encode(&data));
                Ok(data)
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let Some(session) = self.session.take() else {
            // A connect attempt may have linked the device before failing.
            if let (Some(adapter), Some(device)) = (&self.adapter, &self.device) {
                if device.is_connected().await {
                    adapter.disconnect_device(device).await?;
                }
            }
            return Ok(());
        };
        session.forwarder.abort();
        if let Some(adapter) = &self.adapter {
            adapter.disconnect_device(&session.device).await?;
        }
        Ok(())
    }
}

/// Subscribe to `notify` and forward every notification into a channel.
///
/// Returns once the subscription is active, so a command written afterwards
/// cannot race its own reply.
async fn subscribe(
    notify: Characteristic,
) -> anyhow::Result<(mpsc::UnboundedReceiver<Notification>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();

    let forwarder = tokio::spawn(async move {
        let mut stream = match notify.notify().await {
            Ok(stream) => {
                let _ = ready_tx.send(Ok(()));
                stream
            }
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };
        while let Some(item) = stream.next().await {
            if tx.send(item.map_err(TransportError::from)).is_err() {
                return;
            }
        }
        tracing::debug!("BMS: End of notification stream");
    });

    ready_rx
        .await
        .map_err(|_| anyhow!("notification subscription task ended"))??;
    Ok((rx, forwarder))
}

async fn discover_device(address: &str, adapter: &Adapter) -> Result<Device, TransportError> {
    let mut adapter_events = adapter.scan(&[]).await?;
    while let Some(found) = adapter_events.next().await {
        let name = found.device.name_async().await.ok();
        let id = format!("{:?}", found.device.id());
        tracing::trace!("BMS: discovered {id} {name:?}");
        if device_matches(address, name.as_deref(), &id) {
            return Ok(found.device);
        }
    }
    Err(TransportError::DeviceNotFound(address.to_string()))
}

/// Whether a discovered device is the one asked for: either its identifier
/// contains the address (separators and case ignored) or its name equals it.
fn device_matches(address: &str, name: Option<&str>, id: &str) -> bool {
    let wanted = normalize(address);
    if wanted.is_empty() {
        return false;
    }
    name == Some(address) || normalize(id).contains(&wanted)
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_matches_mac() {
        assert!(device_matches("A4:C1:38:0B:6B:FC", None, "DeviceId(a4:c1:38:0b:6b:fc)"));
        assert!(device_matches("a4-c1-38-0b-6b-fc", Some("xiaoxiang"), "A4:C1:38:0B:6B:FC"));
    }

    #[test]
    fn test_device_matches_name() {
        assert!(device_matches("LX-12V100Ah", Some("LX-12V100Ah"), "DeviceId(00:11:22:33:44:55)"));
    }

    #[test]
    fn test_device_no_match() {
        assert!(!device_matches("A4:C1:38:0B:6B:FC", Some("other"), "DeviceId(00:11:22:33:44:55)"));
        assert!(!device_matches("", Some(""), "DeviceId(00:11:22:33:44:55)"));
    }
}
