use crate::api::ApiClient;
use crate::models::{AccountInfo, MediaItem};
use crate::storage::load_user_from_storage;
use leptos::prelude::*;

// Signal handles are Copy, so the whole state bundle is; pages capture it
// freely in event closures.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,

    /// Media records for the library page, as loaded from the backend.
    pub media: RwSignal<Vec<MediaItem>>,
    pub media_loading: RwSignal<bool>,
    pub media_error: RwSignal<Option<String>>,

    /// Media load guard (ignore stale responses).
    pub media_request_id: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
            media: RwSignal::new(vec![]),
            media_loading: RwSignal::new(false),
            media_error: RwSignal::new(None),
            media_request_id: RwSignal::new(0),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
