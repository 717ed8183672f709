//! Book-of-the-year API.

use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::Book;

/// Book-of-the-year API client.
pub struct BookApi {
    client: LyceumClient,
}

impl BookApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// Get the featured book. `None` if none has been chosen yet.
    pub async fn get(&self) -> Result<Option<Book>> {
        match self.client.get("api/book").await {
            Ok(book) => Ok(Some(book)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the featured book.
    pub async fn set(&self, book: &Book) -> Result<Book> {
        self.client.put("api/book", book).await
    }
}
