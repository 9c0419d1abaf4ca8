//! Built-in test suites.
//!
//! Every group here is registered fresh on each call; registration errors
//! surface as [`RegistrationError`] before anything runs.

pub mod builder;
pub mod examples;

use std::sync::Arc;

use cts_core::{FakeDeviceProvider, RegistrationError, Resources, RunnableGroup};

/// Device features the built-in fake provider supports.
pub const FAKE_DEVICE_FEATURES: &[&str] = &["texture-compression-bc"];

/// All built-in groups, in reporting order.
pub fn all() -> Result<Vec<Box<dyn RunnableGroup>>, RegistrationError> {
    Ok(vec![
        Box::new(examples::group()?),
        Box::new(builder::group()?),
    ])
}

/// Resources for the built-in suites: an in-memory device provider.
pub fn resources() -> Resources {
    let provider = FakeDeviceProvider::with_features(FAKE_DEVICE_FEATURES.iter().copied());
    Resources::new().with_device_provider(Arc::new(provider))
}
