//! Executor integration tests against the scripted mock transport.

mod executor;

use crate::testing::MockTransport;
use crate::ApiClient;
use desk_transport::MemoryCookies;
use std::sync::Arc;

/// Build a client over a fresh mock transport and in-memory cookie map.
pub(crate) fn harness() -> (ApiClient, Arc<MockTransport>, Arc<MemoryCookies>) {
    let transport = Arc::new(MockTransport::new());
    let cookies = Arc::new(MemoryCookies::new());
    let client = ApiClient::with_transport(
        "https://desk.example.com/api/v1",
        transport.clone(),
        cookies.clone(),
    )
    .unwrap();
    (client, transport, cookies)
}
