//! Cursor-based keyspace iteration
//!
//! Keys are listed with SCAN in pages of [`PAGE_SIZE`]. An unbounded scan
//! follows the cursor until the server returns 0. A bounded scan stops after
//! a fixed number of pages whether or not the cursor finished, so its result
//! is a sample of the keyspace, never a complete listing.
//!
//! Pages are concatenated in order with no deduplication; if the keyspace
//! changes during iteration a key may appear twice.

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::client::Client;
use crate::error::{CoreError, Result};

/// COUNT hint sent with every SCAN
pub const PAGE_SIZE: usize = 100;

/// How many pages a scan may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanLimit {
    /// Follow the cursor to completion
    Unbounded,
    /// Stop after at most this many pages
    Pages(NonZeroUsize),
}

impl ScanLimit {
    /// Bounded limit; zero is treated as one page
    pub fn pages(pages: usize) -> Self {
        ScanLimit::Pages(NonZeroUsize::new(pages).unwrap_or(NonZeroUsize::MIN))
    }

    fn allows(&self, pages_done: usize) -> bool {
        match self {
            ScanLimit::Unbounded => true,
            ScanLimit::Pages(max) => pages_done < max.get(),
        }
    }
}

/// Position in an ongoing scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    pub cursor: u64,
    pub pattern: String,
    pub count: usize,
}

impl ScanCursor {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            pattern: pattern.into(),
            count: PAGE_SIZE,
        }
    }

    fn command(&self) -> redis::Cmd {
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(self.cursor)
            .arg("MATCH")
            .arg(&self.pattern)
            .arg("COUNT")
            .arg(self.count);
        cmd
    }

    /// Fetch one page and advance. Returns the keys of that page.
    ///
    /// Every page goes to the same node, so in cluster mode only one
    /// primary's keys are listed.
    pub async fn next_page(&mut self, client: &Client) -> Result<Vec<String>> {
        let (next, keys): (u64, Vec<String>) = client
            .query_pinned_as(&self.command())
            .await
            .map_err(CoreError::Scan)?;
        trace!(
            "SCAN {} MATCH {} -> {} key(s), next cursor {}",
            self.cursor,
            self.pattern,
            keys.len(),
            next
        );
        self.cursor = next;
        Ok(keys)
    }

    /// True once the server has handed back cursor 0
    pub fn is_finished(&self) -> bool {
        self.cursor == 0
    }
}

/// Scan keys matching `pattern`.
///
/// Any page failure aborts the scan and discards keys from earlier pages.
pub async fn scan_keys(client: &Client, pattern: &str, limit: ScanLimit) -> Result<Vec<String>> {
    let mut cursor = ScanCursor::new(pattern);
    let mut keys = Vec::new();
    let mut pages = 0;

    while limit.allows(pages) {
        pages += 1;
        keys.extend(cursor.next_page(client).await?);
        if cursor.is_finished() {
            break;
        }
    }

    debug!(
        "Scanned {} page(s) for '{}': {} key(s){}",
        pages,
        pattern,
        keys.len(),
        if cursor.is_finished() { "" } else { " (partial)" }
    );
    Ok(keys)
}
