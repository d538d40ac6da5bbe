use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use types::{api::ValidatorRecord, primitives::PublicKeyBytes};

use crate::cache_index::{CacheIndex, EvictionPolicy};

pub type ValidatorMap = HashMap<PublicKeyBytes, Arc<ValidatorRecord>>;

/// Validators by public key, replaced wholesale on every refresh.
///
/// Readers load a snapshot without locking and never observe a partially replaced set.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: ArcSwap<ValidatorMap>,
}

impl ValidatorRegistry {
    pub fn replace(&self, validators: impl IntoIterator<Item = ValidatorRecord>) {
        let validators = validators
            .into_iter()
            .map(|record| (record.validator.pubkey, Arc::new(record)))
            .collect::<ValidatorMap>();

        self.validators.store(Arc::new(validators));
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ValidatorMap> {
        self.validators.load_full()
    }
}

impl CacheIndex<PublicKeyBytes, Arc<ValidatorRecord>> for ValidatorRegistry {
    fn get(&self, public_key: &PublicKeyBytes) -> Option<Arc<ValidatorRecord>> {
        self.validators.load().get(public_key).cloned()
    }

    fn put(&self, public_key: PublicKeyBytes, record: Arc<ValidatorRecord>) {
        self.validators.rcu(|validators| {
            let mut validators = ValidatorMap::clone(validators);
            validators.insert(public_key, Arc::clone(&record));
            validators
        });
    }

    fn len(&self) -> usize {
        self.validators.load().len()
    }

    fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::Unbounded
    }
}
