//! Resource-provider capability.
//!
//! The engine knows nothing about what a device does. Fixtures receive a
//! [`Resources`] bundle and ask it for devices; everything behind the
//! [`Device`] trait is opaque. [`FakeDeviceProvider`] is an in-memory
//! implementation used by tests and by the built-in example suite.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use thiserror::Error;

use crate::Thrown;

/// Handle to a buffer owned by a [`Device`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Opaque device handle owned by exactly one case.
pub trait Device: Send + Sync {
    fn label(&self) -> &str;

    fn has_feature(&self, feature: &str) -> bool;

    /// Create a buffer initialized with `contents`.
    fn create_buffer(&self, contents: &[u8]) -> Result<BufferId, Thrown>;

    /// Read a buffer back. Completes asynchronously.
    fn read_buffer(&self, buffer: BufferId) -> BoxFuture<'static, Result<Vec<u8>, Thrown>>;

    /// Release the device. Further use fails with an `OperationError`.
    fn destroy(&self);
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeviceRequestError {
    /// The provider cannot supply a device with this feature.
    #[error("device feature `{0}` is not supported")]
    Unsupported(String),

    #[error("device request failed: {0}")]
    Failed(String),
}

/// Supplies devices to fixtures.
pub trait DeviceProvider: Send + Sync {
    fn request_device(&self, features: &[&str]) -> Result<Arc<dyn Device>, DeviceRequestError>;
}

/// Capabilities injected into every fixture.
#[derive(Clone, Default)]
pub struct Resources {
    device_provider: Option<Arc<dyn DeviceProvider>>,
}

impl Resources {
    pub fn new() -> Self {
        Resources::default()
    }

    #[must_use]
    pub fn with_device_provider(mut self, provider: Arc<dyn DeviceProvider>) -> Self {
        self.device_provider = Some(provider);
        self
    }

    pub fn device_provider(&self) -> Option<&Arc<dyn DeviceProvider>> {
        self.device_provider.as_ref()
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("device_provider", &self.device_provider.is_some())
            .finish()
    }
}

// Fake implementation

/// In-memory [`DeviceProvider`] with a fixed feature set.
///
/// Counts devices that have been handed out and not yet destroyed, so tests
/// can check that fixtures release what they acquire.
#[derive(Debug, Default)]
pub struct FakeDeviceProvider {
    features: Vec<String>,
    live: Arc<AtomicUsize>,
    created: AtomicUsize,
}

impl FakeDeviceProvider {
    pub fn new() -> Self {
        FakeDeviceProvider::default()
    }

    /// Provider whose devices support `features`.
    pub fn with_features<S: Into<String>>(features: impl IntoIterator<Item = S>) -> Self {
        FakeDeviceProvider {
            features: features.into_iter().map(Into::into).collect(),
            ..FakeDeviceProvider::default()
        }
    }

    /// Devices handed out and not yet destroyed.
    pub fn live_devices(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Devices handed out in total.
    pub fn created_devices(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl DeviceProvider for FakeDeviceProvider {
    fn request_device(&self, features: &[&str]) -> Result<Arc<dyn Device>, DeviceRequestError> {
        if let Some(missing) = features
            .iter()
            .find(|f| !self.features.iter().any(|have| have == *f))
        {
            return Err(DeviceRequestError::Unsupported((*missing).to_string()));
        }

        let index = self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeDevice {
            label: format!("fake-device-{index}"),
            features: features.iter().map(|f| (*f).to_string()).collect(),
            buffers: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
            live: Arc::clone(&self.live),
        }))
    }
}

struct FakeDevice {
    label: String,
    features: Vec<String>,
    buffers: Mutex<Vec<Arc<[u8]>>>,
    destroyed: AtomicBool,
    live: Arc<AtomicUsize>,
}

impl FakeDevice {
    fn check_alive(&self) -> Result<(), Thrown> {
        if self.destroyed.load(Ordering::SeqCst) {
            Err(Thrown::operation_error(format!(
                "{} has been destroyed",
                self.label
            )))
        } else {
            Ok(())
        }
    }
}

impl Device for FakeDevice {
    fn label(&self) -> &str {
        &self.label
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    fn create_buffer(&self, contents: &[u8]) -> Result<BufferId, Thrown> {
        self.check_alive()?;
        let mut buffers = self.buffers.lock();
        let id = u32::try_from(buffers.len())
            .map_err(|_| Thrown::range_error("too many buffers"))?;
        buffers.push(Arc::from(contents));
        Ok(BufferId(id))
    }

    fn read_buffer(&self, buffer: BufferId) -> BoxFuture<'static, Result<Vec<u8>, Thrown>> {
        let result = self.check_alive().and_then(|()| {
            self.buffers
                .lock()
                .get(buffer.0 as usize)
                .map(|data| data.to_vec())
                .ok_or_else(|| Thrown::operation_error(format!("unknown buffer {}", buffer.0)))
        });
        future::ready(result).boxed()
    }

    fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::SeqCst) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_unsupported_feature_is_refused() {
        let provider = FakeDeviceProvider::with_features(["texture-compression-bc"]);
        assert!(provider.request_device(&["texture-compression-bc"]).is_ok());
        assert_eq!(
            provider.request_device(&["texture-compression-etc"]).err(),
            Some(DeviceRequestError::Unsupported(
                "texture-compression-etc".into()
            ))
        );
    }

    #[test]
    fn test_buffers_round_trip() {
        let provider = FakeDeviceProvider::new();
        let device = provider.request_device(&[]).unwrap();
        let buffer = device.create_buffer(&[0, 1, 2, 3]).unwrap();
        assert_eq!(block_on(device.read_buffer(buffer)).unwrap(), vec![0, 1, 2, 3]);
        assert!(block_on(device.read_buffer(BufferId(9))).is_err());
    }

    #[test]
    fn test_destroy_is_counted_once() {
        let provider = FakeDeviceProvider::new();
        let device = provider.request_device(&[]).unwrap();
        assert_eq!(provider.live_devices(), 1);
        device.destroy();
        device.destroy();
        assert_eq!(provider.live_devices(), 0);
        assert_eq!(device.create_buffer(&[1]).unwrap_err().kind(), "OperationError");
        drop(device);
        assert_eq!(provider.live_devices(), 0);
        assert_eq!(provider.created_devices(), 1);
    }
}
