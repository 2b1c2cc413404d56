//! Capabilities handed to every screen.
//!
//! Built once in `main` and passed down explicitly; screens never reach for
//! process-wide client state.

use portal_grid::RetryConfig;

use crate::backend::PartnerBackend;
use crate::settings::Settings;

/// Who the console is acting for.
#[derive(Debug, Clone)]
pub struct PartnerIdentity {
    pub id: u32,
    pub name: String,
}

#[derive(Clone)]
pub struct PortalContext {
    pub partner: PartnerIdentity,
    pub backend: PartnerBackend,
    pub retry: RetryConfig,
    pub settings: Settings,
}

impl PortalContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            partner: PartnerIdentity {
                id: 1,
                name: settings.partner_name.clone(),
            },
            backend: PartnerBackend::seeded(settings.latency()),
            retry: settings.retry(),
            settings,
        }
    }
}
