//! Resolved catalog: validated entity configs indexed by route, read-only at runtime.

use crate::config::EntityConfig;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Catalog {
    entities: Vec<EntityConfig>,
    by_route: HashMap<(String, String), usize>,
}

impl Catalog {
    pub(crate) fn new(entities: Vec<EntityConfig>) -> Self {
        let by_route = entities
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.module.clone(), e.path_segment.clone()), i))
            .collect();
        Catalog { entities, by_route }
    }

    /// Entity served under `/<module>/<path_segment>`.
    pub fn entity(&self, module: &str, path_segment: &str) -> Option<&EntityConfig> {
        self.by_route
            .get(&(module.to_string(), path_segment.to_string()))
            .and_then(|i| self.entities.get(*i))
    }

    pub fn entity_by_name(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entities(&self) -> &[EntityConfig] {
        &self.entities
    }
}
