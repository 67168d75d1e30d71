use crate::global_constants::PNG_CONTENT_TYPE;

/// A frame that has been written to blob storage.
///
/// The session only keeps this handle; the bytes live in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedImage {
    pub storage_key: String,
    pub public_address: String,
    pub content_type: &'static str,
}

impl PublishedImage {
    pub fn new(storage_key: String, public_address: String) -> Self {
        Self {
            storage_key,
            public_address,
            content_type: PNG_CONTENT_TYPE,
        }
    }
}
