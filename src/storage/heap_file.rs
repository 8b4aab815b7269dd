//! Heap files: one paged, unordered file of rows per table.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::buffer::BufferPool;
use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Permissions, Result, TransactionId};
use crate::storage::heap_page::HeapPage;
use crate::tuple::{Schema, Tuple};

/// An unordered sequence of same-shaped pages backing one table.
///
/// # File layout
/// Pages are laid out sequentially with no file-level header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096    ...    N×4096
/// ```
///
/// The page count derives from the file length. A file that ends one page
/// short is treated as having one additional, logically empty trailing page.
///
/// All row traffic goes through the buffer pool: `insert_tuple` and
/// `delete_tuple` fetch pages from the pool and mutate the cached copy,
/// never the file directly. The file is only touched by `read_page`,
/// `write_page`, and the eager persist of a freshly appended page.
pub struct HeapFile {
    file: Mutex<File>,
    table_id: u32,
    schema: Arc<Schema>,
}

impl HeapFile {
    /// Open an existing heap file, or create an empty one.
    ///
    /// `table_id` must be unique across the catalog; the caller (normally
    /// the catalog owner) is responsible for assigning ids.
    pub fn open<P: AsRef<Path>>(path: P, table_id: u32, schema: Arc<Schema>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(HeapFile {
            file: Mutex::new(file),
            table_id,
            schema,
        })
    }

    /// Id of the table this file backs.
    #[inline]
    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    /// Schema of every row in this file.
    #[inline]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of pages, `ceil(file length / PAGE_SIZE)`.
    pub fn num_pages(&self) -> Result<u32> {
        let len = self.file.lock().metadata()?.len();
        Ok(len.div_ceil(PAGE_SIZE as u64) as u32)
    }

    /// Read and decode one page from disk.
    ///
    /// A short read on the trailing page zero-fills the remainder, so the
    /// partial page decodes as logically empty slots.
    pub fn read_page(&self, pid: PageId) -> Result<HeapPage> {
        if pid.table_id != self.table_id {
            return Err(Error::IllegalState("page does not belong to this table"));
        }
        let mut buf = vec![0u8; PAGE_SIZE];
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(pid.page_no as u64 * PAGE_SIZE as u64))?;
            let mut filled = 0;
            while filled < PAGE_SIZE {
                let n = file.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
        }
        HeapPage::decode(pid, &buf, self.schema.clone())
    }

    /// Encode and write exactly one page's worth of bytes at the page's
    /// offset. Writing at `num_pages()` appends one whole page; the file
    /// is never resized any other way.
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        let bytes = page.encode()?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(
            page.pid().page_no as u64 * PAGE_SIZE as u64,
        ))?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    }

    /// Insert a row into the first page with a free slot, fetching pages
    /// through the buffer pool. When every page is full, append a new
    /// empty page, insert into it, and eagerly persist it (it did not
    /// previously exist on disk). Returns the affected page.
    pub fn insert_tuple(
        &self,
        tx: TransactionId,
        tuple: Tuple,
        pool: &BufferPool,
    ) -> Result<Arc<RwLock<HeapPage>>> {
        let num_pages = self.num_pages()?;
        for page_no in 0..num_pages {
            let pid = PageId::new(self.table_id, page_no);
            let page = pool.get_page(tx, pid, Permissions::ReadWrite)?;
            let has_room = page.read().free_slot_count() > 0;
            if has_room {
                page.write().insert_tuple(tuple)?;
                return Ok(page);
            }
        }

        let pid = PageId::new(self.table_id, num_pages);
        let mut fresh = HeapPage::new_empty(pid, self.schema.clone());
        fresh.insert_tuple(tuple)?;
        self.write_page(&fresh)?;
        pool.get_page(tx, pid, Permissions::ReadWrite)
    }

    /// Delete a row by its storage location, fetching exactly the owning
    /// page through the buffer pool. Returns the affected page.
    pub fn delete_tuple(
        &self,
        tx: TransactionId,
        tuple: &Tuple,
        pool: &BufferPool,
    ) -> Result<Arc<RwLock<HeapPage>>> {
        let rid = tuple.record_id().ok_or(Error::MissingRecordId)?;
        let page = pool.get_page(tx, rid.page_id, Permissions::ReadWrite)?;
        page.write().delete_tuple(rid)?;
        Ok(page)
    }

    /// A lazy, restartable iterator over every row in the file, in page
    /// order and ascending slot order within each page.
    pub fn iter(self: &Arc<Self>, tx: TransactionId, pool: Arc<BufferPool>) -> HeapFileIterator {
        HeapFileIterator {
            file: Arc::clone(self),
            pool,
            tx,
            state: None,
        }
    }
}

/// Iterator state while open: the next page to fetch and the rows of the
/// current page not yet handed out.
struct IterState {
    next_page: u32,
    pending: std::vec::IntoIter<Tuple>,
}

/// Walks a heap file page by page through the buffer pool.
///
/// The sequence is finite and restartable via [`rewind`](Self::rewind);
/// opening an already open iterator is an error.
pub struct HeapFileIterator {
    file: Arc<HeapFile>,
    pool: Arc<BufferPool>,
    tx: TransactionId,
    state: Option<IterState>,
}

impl HeapFileIterator {
    /// Begin iteration. Fails with `IllegalState` if already open.
    pub fn open(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::IllegalState("file iterator is already open"));
        }
        self.state = Some(IterState {
            next_page: 0,
            pending: Vec::new().into_iter(),
        });
        Ok(())
    }

    /// Whether another row is available. Advances across page boundaries
    /// as needed; returns false when the iterator is not open.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.state.is_none() {
            return Ok(false);
        }
        let num_pages = self.file.num_pages()?;
        let state = match self.state.as_mut() {
            Some(state) => state,
            None => return Ok(false),
        };
        while state.pending.len() == 0 {
            if state.next_page >= num_pages {
                return Ok(false);
            }
            let pid = PageId::new(self.file.table_id(), state.next_page);
            state.next_page += 1;
            let page = self.pool.get_page(self.tx, pid, Permissions::ReadOnly)?;
            let rows: Vec<Tuple> = page.read().iter().cloned().collect();
            state.pending = rows.into_iter();
        }
        Ok(true)
    }

    /// Next row. Fails with `NoSuchElement` when unopened or exhausted.
    pub fn next(&mut self) -> Result<Tuple> {
        if self.state.is_none() {
            return Err(Error::NoSuchElement("file iterator has not been opened"));
        }
        if !self.has_next()? {
            return Err(Error::NoSuchElement("no more rows in file"));
        }
        match self.state.as_mut() {
            Some(state) => state
                .pending
                .next()
                .ok_or(Error::NoSuchElement("no more rows in file")),
            None => Err(Error::NoSuchElement("file iterator has not been opened")),
        }
    }

    /// Restart from the first page.
    pub fn rewind(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    /// Stop iterating; the iterator may be reopened.
    pub fn close(&mut self) {
        self.state = None;
    }
}
