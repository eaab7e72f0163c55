//! Dependencies injected into the console reducers.

use checkin_api::Gateway;
use checkin_core::environment::Clock;
use std::sync::Arc;

/// Environment shared by every page reducer.
#[derive(Clone)]
pub struct ConsoleEnvironment {
    /// Backend access
    pub gateway: Gateway,
    /// Source of "today"
    pub clock: Arc<dyn Clock>,
}

impl ConsoleEnvironment {
    /// Bundle a gateway and a clock.
    #[must_use]
    pub fn new(gateway: Gateway, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }
}
