use std::sync::Arc;

use intake_core::SubmissionCoordinator;
use reference::ReferenceCache;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) reference: Arc<ReferenceCache>,
    pub(crate) coordinator: Arc<SubmissionCoordinator>,
}
