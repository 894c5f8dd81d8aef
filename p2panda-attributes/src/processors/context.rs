// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeMap;

use p2panda_attributes_core::{Address, Attribute, AttributeId, Reference, Timestamp};

/// Circumstances an item is processed in.
///
/// While processing, the state of every attribute before its first mutation is captured here so
/// that a rollback with the same context restores exactly that state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemContext {
    /// Peer who sent the item.
    pub sender: Address,

    /// Reference to the message which carried the item.
    pub reference: Reference,

    pub received_at: Timestamp,

    /// State of touched attributes before processing, `None` for attributes which did not exist.
    snapshots: BTreeMap<AttributeId, Option<Attribute>>,

    /// Listeners which were registered while processing.
    listeners: Vec<Reference>,

    processed: bool,
}

impl ItemContext {
    pub fn new(sender: &Address, reference: Reference) -> Self {
        Self {
            sender: sender.clone(),
            reference,
            received_at: Timestamp::now(),
            snapshots: BTreeMap::new(),
            listeners: Vec::new(),
            processed: false,
        }
    }

    pub fn with_received_at(mut self, received_at: Timestamp) -> Self {
        self.received_at = received_at;
        self
    }

    /// Captures the state of an attribute unless an earlier state was captured already.
    pub fn record(&mut self, attribute: &Attribute) {
        self.snapshots
            .entry(attribute.id())
            .or_insert_with(|| Some(attribute.clone()));
    }

    /// Marks that the item went through processing with this context.
    ///
    /// Rolling back a processed context only restores what was captured, even if processing
    /// failed before capturing anything.
    pub fn mark_processed(&mut self) {
        self.processed = true;
    }

    pub fn was_processed(&self) -> bool {
        self.processed
    }

    /// Captures that an attribute did not exist before processing created it.
    pub fn record_absent(&mut self, id: AttributeId) {
        self.snapshots.entry(id).or_insert(None);
    }

    pub fn snapshots(&self) -> &BTreeMap<AttributeId, Option<Attribute>> {
        &self.snapshots
    }

    pub fn has_snapshots(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Captures that a listener was registered while processing.
    pub fn record_listener(&mut self, id: Reference) {
        if !self.listeners.contains(&id) {
            self.listeners.push(id);
        }
    }

    pub fn registered_listener(&self, id: &Reference) -> bool {
        self.listeners.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use p2panda_attributes_core::Reference;
    use p2panda_attributes_core::test_utils::{address, own_identity_attribute};

    use super::ItemContext;

    #[test]
    fn first_snapshot_wins() {
        let mut context = ItemContext::new(&address("bob"), Reference::new("msg"));
        let original = own_identity_attribute(&address("alice"), "Alice");
        let mut changed = original.clone();
        changed.set_default(true);

        context.record(&original);
        context.record(&changed);
        context.record_absent(original.id());

        assert_eq!(
            context.snapshots().get(&original.id()),
            Some(&Some(original))
        );
    }
}
