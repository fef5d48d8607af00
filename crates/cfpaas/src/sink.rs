use cfpaas_core::{Attribute, AttributeSink, AttributeStore};
use serde_json::Value;

/// Logs attribute changes of one application or service and keeps the latest values
pub struct ConsoleSink {
    entity: String,
    store: AttributeStore,
}

impl ConsoleSink {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            store: AttributeStore::new(),
        }
    }

    pub fn store(&self) -> &AttributeStore {
        &self.store
    }
}

impl AttributeSink for ConsoleSink {
    fn on_state_changed(&self, attribute: Attribute, value: Value) {
        match (&attribute, &value) {
            (_, Value::Null) => tracing::debug!("{}: {} cleared", self.entity, attribute.key()),
            (Attribute::ServiceCredentials, _) => {
                tracing::debug!("{}: {} updated", self.entity, attribute.key())
            }
            _ => tracing::debug!("{}: {} = {}", self.entity, attribute.key(), value),
        }
        self.store.on_state_changed(attribute, value);
    }
}
