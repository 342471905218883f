// src/recovery/devices.rs

//! Removable-media device enumeration and ejection.

use tracing::info;
use url::Url;

use crate::error::Result;

/// Boundary to the platform's removable-media handling.
///
/// The engine only ever needs to list the devices serving a location
/// and eject one of them; everything else about media management stays
/// outside this crate.
pub trait DeviceEjector {
    /// Device paths currently serving `url`, e.g. "/dev/sr0".
    fn detect(&self, url: &Url) -> Vec<String>;

    /// Eject the medium in `device`. A failure is reported to the
    /// operator as a warning but never aborts the recovery flow.
    fn eject(&self, url: &Url, device: &str) -> Result<()>;
}

/// A fixed device list whose ejection only logs.
///
/// Useful for embedding on systems without removable media and for
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDevices {
    devices: Vec<String>,
}

impl StaticDevices {
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }
}

impl DeviceEjector for StaticDevices {
    fn detect(&self, _url: &Url) -> Vec<String> {
        self.devices.clone()
    }

    fn eject(&self, url: &Url, device: &str) -> Result<()> {
        info!("ejecting {} for {}", device, url);
        Ok(())
    }
}
