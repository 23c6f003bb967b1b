use serde::Serialize;

use crate::common::{CorpusError, CorpusResult};

/// A publication channel (e.g. a regional New Tab feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledSurface {
    pub guid: &'static str,
    pub name: &'static str,
    /// IANA timezone the surface's calendar dates are expressed in.
    pub iana_timezone: &'static str,
    /// Access-control group whose members may curate the surface.
    pub access_group: &'static str,
    pub utm_source: &'static str,
}

const DEFAULT_SURFACES: &[ScheduledSurface] = &[
    ScheduledSurface {
        guid: "NEW_TAB_EN_US",
        name: "New Tab (en-US)",
        iana_timezone: "America/New_York",
        access_group: "curator-new-tab-en-us",
        utm_source: "pocket-newtab-en-us",
    },
    ScheduledSurface {
        guid: "NEW_TAB_DE_DE",
        name: "New Tab (de-DE)",
        iana_timezone: "Europe/Berlin",
        access_group: "curator-new-tab-de-de",
        utm_source: "pocket-newtab-de-de",
    },
    ScheduledSurface {
        guid: "NEW_TAB_EN_GB",
        name: "New Tab (en-GB)",
        iana_timezone: "Europe/London",
        access_group: "curator-new-tab-en-gb",
        utm_source: "pocket-newtab-en-gb",
    },
    ScheduledSurface {
        guid: "NEW_TAB_EN_INTL",
        name: "New Tab (en-INTL)",
        iana_timezone: "Asia/Kolkata",
        access_group: "curator-new-tab-en-intl",
        utm_source: "pocket-newtab-en-intl",
    },
    ScheduledSurface {
        guid: "NEW_TAB_FR_FR",
        name: "New Tab (fr-FR)",
        iana_timezone: "Europe/Paris",
        access_group: "curator-new-tab-fr-fr",
        utm_source: "pocket-newtab-fr-fr",
    },
    ScheduledSurface {
        guid: "NEW_TAB_IT_IT",
        name: "New Tab (it-IT)",
        iana_timezone: "Europe/Rome",
        access_group: "curator-new-tab-it-it",
        utm_source: "pocket-newtab-it-it",
    },
    ScheduledSurface {
        guid: "NEW_TAB_ES_ES",
        name: "New Tab (es-ES)",
        iana_timezone: "Europe/Madrid",
        access_group: "curator-new-tab-es-es",
        utm_source: "pocket-newtab-es-es",
    },
    ScheduledSurface {
        guid: "POCKET_HITS_EN_US",
        name: "Pocket Hits (en-US)",
        iana_timezone: "America/New_York",
        access_group: "curator-pocket-hits-en-us",
        utm_source: "pocket-hits-en-us",
    },
    ScheduledSurface {
        guid: "POCKET_HITS_DE_DE",
        name: "Pocket Hits (de-DE)",
        iana_timezone: "Europe/Berlin",
        access_group: "curator-pocket-hits-de-de",
        utm_source: "pocket-hits-de-de",
    },
    ScheduledSurface {
        guid: "SANDBOX",
        name: "Sandbox",
        iana_timezone: "America/New_York",
        access_group: "curator-sandbox",
        utm_source: "sandbox",
    },
];

/// Read-only lookup table of valid surfaces, built once at startup and shared
/// through `CorpusDeps`.
#[derive(Debug, Clone)]
pub struct SurfaceRegistry {
    surfaces: Vec<ScheduledSurface>,
}

impl SurfaceRegistry {
    pub fn new(surfaces: Vec<ScheduledSurface>) -> Self {
        Self { surfaces }
    }

    pub fn find(&self, guid: &str) -> Option<&ScheduledSurface> {
        self.surfaces.iter().find(|s| s.guid == guid)
    }

    /// Looks up a surface, failing with a validation error naming the guid.
    pub fn require(&self, guid: &str) -> CorpusResult<&ScheduledSurface> {
        self.find(guid).ok_or_else(|| {
            CorpusError::validation(format!(
                "Cannot use an unknown scheduled surface: \"{}\"",
                guid
            ))
        })
    }

    pub fn all(&self) -> &[ScheduledSurface] {
        &self.surfaces
    }

    pub fn for_access_group(&self, group: &str) -> Vec<&ScheduledSurface> {
        self.surfaces
            .iter()
            .filter(|s| s.access_group == group)
            .collect()
    }
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACES.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CorpusErrorKind;

    #[test]
    fn test_default_registry_knows_new_tab_surfaces() {
        let registry = SurfaceRegistry::default();
        let surface = registry.find("NEW_TAB_DE_DE").unwrap();
        assert_eq!(surface.iana_timezone, "Europe/Berlin");
        assert_eq!(registry.all().len(), 10);
    }

    #[test]
    fn test_require_rejects_unknown_guid() {
        let registry = SurfaceRegistry::default();
        let err = registry.require("NEW_TAB_XX_XX").unwrap_err();
        assert_eq!(err.kind(), CorpusErrorKind::Validation);
        assert!(err.to_string().contains("NEW_TAB_XX_XX"));
    }

    #[test]
    fn test_guids_are_case_sensitive() {
        let registry = SurfaceRegistry::default();
        assert!(registry.find("new_tab_en_us").is_none());
    }

    #[test]
    fn test_for_access_group() {
        let registry = SurfaceRegistry::default();
        let surfaces = registry.for_access_group("curator-sandbox");
        assert_eq!(surfaces.len(), 1);
        assert_eq!(surfaces[0].guid, "SANDBOX");
    }
}
