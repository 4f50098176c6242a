use crate::probes::{
    email_probes, phone_probes, profile_probes, AccessibilityProbe, AddressProbe, DnsSummaryProbe,
    Probe,
};
use lookout_core::{Identifier, QueryType};
use std::collections::HashMap;
use std::sync::Arc;

/// Probes grouped by query type, in registration order.
#[derive(Default, Clone)]
pub struct ProbeRegistry {
    probes: HashMap<QueryType, Vec<Arc<dyn Probe>>>,
}

impl ProbeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in probe set for every query type.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for probe in profile_probes() {
            registry.register(QueryType::Username, probe);
        }
        for probe in phone_probes() {
            registry.register(QueryType::Phone, probe);
        }
        for probe in email_probes() {
            registry.register(QueryType::Email, probe);
        }
        registry.register(QueryType::Domain, Arc::new(AddressProbe));
        registry.register(QueryType::Domain, Arc::new(AccessibilityProbe));
        registry.register(QueryType::Domain, Arc::new(DnsSummaryProbe));
        registry
    }

    /// Append a probe for `query_type`.
    pub fn register(&mut self, query_type: QueryType, probe: Arc<dyn Probe>) -> &mut Self {
        self.probes.entry(query_type).or_default().push(probe);
        self
    }

    /// Every probe registered for `query_type`.
    #[must_use]
    pub fn registered(&self, query_type: QueryType) -> &[Arc<dyn Probe>] {
        self.probes.get(&query_type).map_or(&[][..], Vec::as_slice)
    }

    /// Probes that apply to `identifier`, in registration order.
    #[must_use]
    pub fn probes_for(&self, identifier: &Identifier) -> Vec<Arc<dyn Probe>> {
        self.registered(identifier.query_type())
            .iter()
            .filter(|probe| probe.applies_to(identifier))
            .cloned()
            .collect()
    }

    /// Number of probes registered for `query_type`.
    #[must_use]
    pub fn len(&self, query_type: QueryType) -> usize {
        self.registered(query_type).len()
    }
}

impl std::fmt::Debug for ProbeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for query_type in QueryType::ALL {
            let names: Vec<&str> = self
                .registered(query_type)
                .iter()
                .map(|p| p.platform())
                .collect();
            map.entry(&query_type, &names);
        }
        map.finish()
    }
}
