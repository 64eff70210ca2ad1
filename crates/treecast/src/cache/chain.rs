use std::sync::Arc;

use log::debug;
use treecast_core::definition::ClassDefinition;

use crate::cache::DefinitionCache;

/// Tiers queried in order. A hit in a later tier is copied into every
/// earlier one.
pub struct ChainCache {
    tiers: Vec<Box<dyn DefinitionCache>>,
}

impl ChainCache {
    pub fn new(tiers: Vec<Box<dyn DefinitionCache>>) -> Self {
        Self { tiers }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl DefinitionCache for ChainCache {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>> {
        for (index, tier) in self.tiers.iter().enumerate() {
            if let Some(definition) = tier.get(key) {
                if index > 0 {
                    debug!(key = key, tier = index; "Backfilling faster cache tiers");
                    for faster in &self.tiers[..index] {
                        faster.set(key, &definition);
                    }
                }
                return Some(definition);
            }
        }
        None
    }

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>) {
        for tier in &self.tiers {
            tier.set(key, definition);
        }
    }

    fn clear(&self) {
        for tier in &self.tiers {
            tier.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use treecast_core::{
        definition::{Attributes, Parameters},
        types::ClassType,
    };

    use super::*;
    use crate::cache::RuntimeCache;

    fn definition() -> Arc<ClassDefinition> {
        Arc::new(ClassDefinition::new(
            ClassType::new("Point"),
            Attributes::empty(),
            Parameters::default(),
        ))
    }

    #[test]
    fn test_hit_in_slow_tier_backfills_fast_tier() {
        let fast = Arc::new(RuntimeCache::new());
        let slow = Arc::new(RuntimeCache::new());
        slow.set("Point", &definition());

        let chain = ChainCache::new(vec![
            Box::new(fast.clone()),
            Box::new(slow.clone()),
        ]);

        assert!(fast.is_empty());
        assert_eq!(chain.get("Point"), Some(definition()));
        assert_eq!(fast.len(), 1);
    }

    #[test]
    fn test_set_and_clear_reach_every_tier() {
        let fast = Arc::new(RuntimeCache::new());
        let slow = Arc::new(RuntimeCache::new());
        let chain = ChainCache::new(vec![
            Box::new(fast.clone()),
            Box::new(slow.clone()),
        ]);

        chain.set("Point", &definition());
        assert_eq!((fast.len(), slow.len()), (1, 1));

        chain.clear();
        assert!(fast.is_empty() && slow.is_empty());
    }
}
