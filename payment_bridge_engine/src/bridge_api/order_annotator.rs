use std::fmt::Debug;

use log::*;

use crate::{
    bridge_types::{NoteAttribute, OrderId, OrderSnapshot, TagSet},
    traits::{OrderManagement, OrderManagementError},
};

/// The result of an attempt to add a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUpdate {
    /// The tag was added. Contains the full tag set that was written.
    Added(TagSet),
    /// The tag was already present; nothing was written.
    Unchanged,
}

/// The result of an attempt to set note attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteUpdate {
    /// At least one value changed. Contains the full attribute list that was written.
    Written(Vec<NoteAttribute>),
    /// Every value was already as requested; nothing was written.
    Unchanged,
}

/// `OrderAnnotator` adds payment metadata to orders on the commerce platform without clobbering unrelated edits.
///
/// Every update is a read-modify-write: the current order is read, the change is merged in, and the merged field is
/// written back. This is **not atomic**. If somebody else edits the same field between the read and the write, their
/// edit is lost. In practice the bridge is the only automated writer and deliveries for one order are rare and spread
/// out, so this is accepted rather than engineered around.
pub struct OrderAnnotator<B> {
    backend: B,
}

impl<B> Debug for OrderAnnotator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderAnnotator")
    }
}

impl<B> OrderAnnotator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B> OrderAnnotator<B>
where B: OrderManagement
{
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderSnapshot, OrderManagementError> {
        self.backend.fetch_order(order_id).await
    }

    /// Adds `tag` to the order's tags, reading the current tags first.
    pub async fn add_tag(&self, order_id: &OrderId, tag: &str) -> Result<TagUpdate, OrderManagementError> {
        let order = self.backend.fetch_order(order_id).await?;
        self.add_tag_to(&order, tag).await
    }

    /// Adds `tag` to the tags of `order`, which the caller has just read.
    pub async fn add_tag_to(&self, order: &OrderSnapshot, tag: &str) -> Result<TagUpdate, OrderManagementError> {
        let mut tags = order.tags.clone();
        if !tags.insert(tag) {
            debug!("🏷️ Order {} already has tag '{tag}'. Nothing to do.", order.id);
            return Ok(TagUpdate::Unchanged);
        }
        let order_id = order.order_id();
        self.backend.write_tags(&order_id, &tags).await?;
        info!("🏷️ Tagged order {order_id} with '{tag}'. Tags are now [{tags}]");
        Ok(TagUpdate::Added(tags))
    }

    pub async fn set_note_field(
        &self,
        order_id: &OrderId,
        name: &str,
        value: &str,
    ) -> Result<NoteUpdate, OrderManagementError> {
        self.set_note_fields(order_id, &[NoteAttribute::new(name, value)]).await
    }

    /// Sets each of `fields` on the order, reading the current note attributes first.
    pub async fn set_note_fields(
        &self,
        order_id: &OrderId,
        fields: &[NoteAttribute],
    ) -> Result<NoteUpdate, OrderManagementError> {
        let order = self.backend.fetch_order(order_id).await?;
        self.set_note_fields_on(&order, fields).await
    }

    /// Sets each of `fields` on `order`, which the caller has just read.
    ///
    /// An existing attribute with the same name has its value replaced (every copy, since names are not unique
    /// upstream). Otherwise the field is appended. Attributes not named in `fields` are written back untouched.
    pub async fn set_note_fields_on(
        &self,
        order: &OrderSnapshot,
        fields: &[NoteAttribute],
    ) -> Result<NoteUpdate, OrderManagementError> {
        let (merged, changed) = merge_note_attributes(&order.note_attributes, fields);
        if !changed {
            debug!("📝️ Order {} already has the requested note attributes.", order.id);
            return Ok(NoteUpdate::Unchanged);
        }
        let order_id = order.order_id();
        self.backend.write_note_attributes(&order_id, &merged).await?;
        let names = fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ");
        info!("📝️ Updated note attributes [{names}] on order {order_id}");
        Ok(NoteUpdate::Written(merged))
    }

    pub async fn mark_as_paid(&self, order_id: &OrderId) -> Result<(), OrderManagementError> {
        self.backend.mark_as_paid(order_id).await
    }
}

fn merge_note_attributes(current: &[NoteAttribute], fields: &[NoteAttribute]) -> (Vec<NoteAttribute>, bool) {
    let mut merged = current.to_vec();
    let mut changed = false;
    for field in fields {
        let mut found = false;
        for existing in merged.iter_mut().filter(|a| a.name == field.name) {
            found = true;
            if existing.value != field.value {
                existing.value = field.value.clone();
                changed = true;
            }
        }
        if !found {
            merged.push(field.clone());
            changed = true;
        }
    }
    (merged, changed)
}
