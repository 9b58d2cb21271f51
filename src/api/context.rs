// Shared state of the request handlers

use std::{path::PathBuf, sync::Arc};

use crate::{auth::AuthConfiguration, log::Logger, store::Store};

/// State shared by every request handler
#[derive(Clone)]
pub struct ApiContext {
    pub logger: Arc<Logger>,
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthConfiguration>,

    /// Root directory of attachment files
    pub upload_dir: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(
        logger: Arc<Logger>,
        store: Arc<dyn Store>,
        auth: Arc<AuthConfiguration>,
        upload_dir: PathBuf,
    ) -> ApiContext {
        ApiContext {
            logger,
            store,
            auth,
            upload_dir: Arc::new(upload_dir),
        }
    }
}
