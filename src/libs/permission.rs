//! Platform permission prompts.
//!
//! Prompt wording and buttons belong to the host shell; the core only needs
//! to know whether access was granted.

use std::sync::Arc;
use tracing::warn;

pub trait PermissionGate: Send + Sync {
    /// Prompts for location access if needed and reports whether it was granted.
    fn request_location_permission(&self) -> bool;

    /// Reports whether location access is already granted, without prompting.
    fn check_location_permission(&self) -> bool;
}

/// Gate with a fixed answer, for hosts without a permission model.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissionGate {
    granted: bool,
}

impl StaticPermissionGate {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionGate for StaticPermissionGate {
    fn request_location_permission(&self) -> bool {
        self.granted
    }

    fn check_location_permission(&self) -> bool {
        self.granted
    }
}

/// Requests everything the app needs in one go at startup.
#[derive(Clone)]
pub struct PermissionService {
    gate: Arc<dyn PermissionGate>,
}

impl PermissionService {
    pub fn new(gate: Arc<dyn PermissionGate>) -> Self {
        Self { gate }
    }

    /// Returns `true` only if every required permission was granted.
    pub fn request_all_permissions(&self) -> bool {
        let location = self.gate.request_location_permission();
        if !location {
            warn!("location permission was not granted");
        }
        location
    }

    pub fn check_location_permission(&self) -> bool {
        self.gate.check_location_permission()
    }
}
