//! Slotted heap pages: the fixed-size on-disk container for rows.

use std::sync::Arc;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, RecordId, Result, TransactionId};
use crate::tuple::{Schema, Tuple};

/// A decoded 4KB heap page: an occupancy bitmap followed by fixed-size
/// row slots.
///
/// # On-disk layout
/// ```text
/// ┌────────────────────┬─────────┬─────────┬─────────┬──────────┐
/// │ bitmap             │ slot 0  │ slot 1  │  ...    │ (unused) │
/// │ ceil(capacity/8) B │ row B   │ row B   │         │ zeroes   │
/// └────────────────────┴─────────┴─────────┴─────────┴──────────┘
/// ```
///
/// Bit `i` of the bitmap (byte `i / 8`, bit `i % 8`, least significant
/// first) records whether slot `i` holds a row. With `row_bytes` from the
/// schema, `capacity = (PAGE_SIZE * 8) / (row_bytes * 8 + 1)` — each slot
/// costs its row bits plus one bitmap bit. Free slots encode as zeroes.
///
/// A page tracks whether it has been modified since loading and which
/// transaction last wrote it, so the buffer pool can write back and
/// attribute dirty pages.
#[derive(Debug, Clone)]
pub struct HeapPage {
    pid: PageId,
    schema: Arc<Schema>,
    slots: Vec<Option<Tuple>>,
    dirtied_by: Option<TransactionId>,
}

impl HeapPage {
    /// Number of row slots a page holds for rows of this schema.
    pub fn slot_capacity(schema: &Schema) -> usize {
        (PAGE_SIZE * 8) / (schema.byte_size() * 8 + 1)
    }

    /// Bytes of bitmap needed for `capacity` slots.
    fn bitmap_bytes(capacity: usize) -> usize {
        capacity.div_ceil(8)
    }

    /// Create an empty page (all slots free).
    pub fn new_empty(pid: PageId, schema: Arc<Schema>) -> Self {
        let capacity = Self::slot_capacity(&schema);
        HeapPage {
            pid,
            schema,
            slots: vec![None; capacity],
            dirtied_by: None,
        }
    }

    /// Decode a page from exactly [`PAGE_SIZE`] raw bytes.
    ///
    /// Reads the occupancy bitmap, then decodes a row at each occupied
    /// slot's byte offset; free slots are skipped. Every decoded row is
    /// stamped with its [`RecordId`].
    pub fn decode(pid: PageId, bytes: &[u8], schema: Arc<Schema>) -> Result<Self> {
        if bytes.len() != PAGE_SIZE {
            return Err(Error::IllegalState("page buffer must be PAGE_SIZE bytes"));
        }
        let capacity = Self::slot_capacity(&schema);
        let bitmap_len = Self::bitmap_bytes(capacity);
        let row_bytes = schema.byte_size();

        let mut slots = vec![None; capacity];
        for (slot, entry) in slots.iter_mut().enumerate() {
            let occupied = bytes[slot / 8] & (1 << (slot % 8)) != 0;
            if !occupied {
                continue;
            }
            let mut off = bitmap_len + slot * row_bytes;
            let mut tuple = Tuple::new(schema.clone());
            for (i, column) in schema.columns().iter().enumerate() {
                let width = column.ty.width();
                let value = crate::tuple::Field::decode(&column.ty, &bytes[off..off + width]);
                tuple.set_field(i, value)?;
                off += width;
            }
            tuple.set_record_id(Some(RecordId::new(pid, slot)));
            *entry = Some(tuple);
        }

        Ok(HeapPage {
            pid,
            schema,
            slots,
            dirtied_by: None,
        })
    }

    /// Encode this page into exactly [`PAGE_SIZE`] bytes, the inverse of
    /// [`HeapPage::decode`]. Free slot payloads and the tail are zeroes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; PAGE_SIZE];
        let bitmap_len = Self::bitmap_bytes(self.slots.len());
        let row_bytes = self.schema.byte_size();

        for (slot, entry) in self.slots.iter().enumerate() {
            let Some(tuple) = entry else { continue };
            bytes[slot / 8] |= 1 << (slot % 8);

            let mut off = bitmap_len + slot * row_bytes;
            for (i, column) in self.schema.columns().iter().enumerate() {
                let width = column.ty.width();
                let value = tuple
                    .field(i)
                    .ok_or(Error::IllegalState("stored row has an unset field"))?;
                value.encode(&column.ty, &mut bytes[off..off + width])?;
                off += width;
            }
        }
        Ok(bytes)
    }

    /// This page's identity.
    #[inline]
    pub fn pid(&self) -> PageId {
        self.pid
    }

    /// Schema of the rows this page stores.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of slots not currently holding a row.
    pub fn free_slot_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Whether slot `i` holds a row.
    pub fn is_slot_occupied(&self, i: usize) -> bool {
        self.slots.get(i).is_some_and(|s| s.is_some())
    }

    /// Insert a row into the first free slot.
    ///
    /// The row must match this page's schema and be fully assigned. On
    /// success the slot is marked occupied and the row's [`RecordId`] is
    /// stamped; fails with `PageFull` when no slot is free.
    pub fn insert_tuple(&mut self, mut tuple: Tuple) -> Result<RecordId> {
        if **tuple.schema() != *self.schema {
            return Err(Error::SchemaMismatch(format!(
                "row shape {} does not match page shape {}",
                tuple.schema(),
                self.schema
            )));
        }
        if !tuple.is_complete() {
            return Err(Error::SchemaMismatch(
                "row has unset fields and cannot be stored".into(),
            ));
        }
        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(Error::PageFull(self.pid))?;
        let rid = RecordId::new(self.pid, slot);
        tuple.set_record_id(Some(rid));
        self.slots[slot] = Some(tuple);
        Ok(rid)
    }

    /// Clear the slot addressed by `rid`.
    ///
    /// Fails with `SlotNotOccupied` if the slot is already free. The
    /// payload bytes are not zeroed until the page is re-encoded.
    pub fn delete_tuple(&mut self, rid: RecordId) -> Result<()> {
        if rid.page_id != self.pid {
            return Err(Error::IllegalState("record does not belong to this page"));
        }
        match self.slots.get_mut(rid.slot) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(Error::SlotNotOccupied(rid)),
        }
    }

    /// Occupied rows in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    /// Mark this page modified by `tx`.
    pub fn mark_dirty(&mut self, tx: TransactionId) {
        self.dirtied_by = Some(tx);
    }

    /// Clear the dirty flag after a successful write-back.
    pub fn clear_dirty(&mut self) {
        self.dirtied_by = None;
    }

    /// Whether the page has unflushed modifications.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    /// Transaction that last dirtied this page, if any.
    #[inline]
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirtied_by
    }
}

impl PartialEq for HeapPage {
    /// Bitmap and occupied slot contents; dirty bookkeeping is excluded.
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid && self.slots == other.slots
    }
}

impl Eq for HeapPage {}
