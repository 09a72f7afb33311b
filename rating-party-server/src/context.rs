use std::sync::Arc;

use rating_party_collab::Party;

#[derive(Clone)]
pub struct ServerContext {
    pub party: Arc<Party>,
}
