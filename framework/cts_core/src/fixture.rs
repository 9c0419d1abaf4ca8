//! Per-case fixtures.
//!
//! A fixture is the capability set a test body works with. Each group is
//! parameterized by one fixture type; the runner acquires a fresh fixture
//! before every case and releases it on every exit path before the next
//! case on the same worker starts.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::{Device, DeviceProvider, DeviceRequestError, Resources};
use crate::Thrown;

pub trait Fixture: Sized + Send + Sync + 'static {
    /// Acquire per-case resources.
    fn acquire(resources: &Resources) -> Result<Self, Thrown>;

    /// Release what `acquire` took. Called exactly once per case.
    fn release(&self) {}
}

/// Fixture with no resources.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicFixture;

impl Fixture for BasicFixture {
    fn acquire(_resources: &Resources) -> Result<Self, Thrown> {
        Ok(BasicFixture)
    }
}

/// Fixture owning one device from the injected [`DeviceProvider`].
pub struct DeviceFixture {
    provider: Arc<dyn DeviceProvider>,
    device: Mutex<Option<Arc<dyn Device>>>,
}

impl DeviceFixture {
    /// The device currently held by this case.
    pub fn device(&self) -> Result<Arc<dyn Device>, Thrown> {
        self.device
            .lock()
            .clone()
            .ok_or_else(|| Thrown::operation_error("device already released"))
    }

    /// Replace the current device with one supporting `features`.
    ///
    /// The old device is destroyed only once the new one is available.
    pub fn select_device(&self, features: &[&str]) -> Result<(), DeviceRequestError> {
        let next = self.provider.request_device(features)?;
        tracing::debug!(device = next.label(), ?features, "selected device");
        if let Some(previous) = self.device.lock().replace(next) {
            previous.destroy();
        }
        Ok(())
    }
}

impl Fixture for DeviceFixture {
    fn acquire(resources: &Resources) -> Result<Self, Thrown> {
        let provider = resources
            .device_provider()
            .cloned()
            .ok_or_else(|| Thrown::new("NotSupportedError", "no device provider configured"))?;
        let device = provider
            .request_device(&[])
            .map_err(|e| Thrown::operation_error(e.to_string()))?;
        Ok(DeviceFixture {
            provider,
            device: Mutex::new(Some(device)),
        })
    }

    fn release(&self) {
        if let Some(device) = self.device.lock().take() {
            device.destroy();
        }
    }
}
