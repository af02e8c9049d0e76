//! Integration tests for the NDOP reconciliation service
//!
//! These tests verify the correlation protocol: batches remembered at send
//! time, control files recording the correlation ID, and data files resolved
//! back to their batch through the two-hop cache lookup.

use async_trait::async_trait;
use meshbridge::adapters::cache::{get_json, put_json, InMemoryTrackingCache};
use meshbridge::adapters::fhir::{Bundle, ConvertDataRequest, FhirStore};
use meshbridge::adapters::mesh::control::build_control_file;
use meshbridge::adapters::mesh::{MeshExchange, SentMessage};
use meshbridge::core::NdopService;
use meshbridge::domain::{FhirError, MeshError, MeshMessage, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const PAGE_SIZE: usize = 2;
const TTL: Duration = Duration::from_secs(48 * 3600);

struct MockMesh {
    sent: Mutex<Vec<String>>,
    send_attempts: AtomicUsize,
    inbox: Vec<MeshMessage>,
    acknowledged: Mutex<Vec<String>>,
}

impl MockMesh {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            send_attempts: AtomicUsize::new(0),
            inbox: Vec::new(),
            acknowledged: Mutex::new(Vec::new()),
        }
    }

    fn with_inbox(inbox: Vec<MeshMessage>) -> Self {
        Self {
            inbox,
            ..Self::new()
        }
    }
}

#[async_trait]
impl MeshExchange for MockMesh {
    async fn send_message(&self, content: &str) -> Result<SentMessage> {
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(content.to_string());
        Ok(SentMessage {
            message_id: format!("msg-{attempt}"),
            tracking_id: Some(format!("trk-{attempt}")),
        })
    }

    async fn list_messages(&self) -> Result<Vec<String>> {
        Ok(self.inbox.iter().map(|m| m.id.clone()).collect())
    }

    async fn retrieve_message(&self, message_id: &str) -> Result<MeshMessage> {
        self.inbox
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| {
                MeshError::RetrieveFailed {
                    message_id: message_id.to_string(),
                    message: "not found".to_string(),
                }
                .into()
            })
    }

    async fn acknowledge_message(&self, message_id: &str) -> Result<bool> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(message_id.to_string());
        Ok(true)
    }
}

struct MockFhir {
    pages: Mutex<VecDeque<Bundle>>,
    convert_requests: Mutex<Vec<ConvertDataRequest>>,
    transactions: Mutex<Vec<Bundle>>,
}

impl MockFhir {
    fn with_pages(pages: Vec<Bundle>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            convert_requests: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FhirStore for MockFhir {
    async fn search_patients(&self, _page_size: usize) -> Result<Bundle> {
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FhirError::SearchFailed("no pages".to_string()).into())
    }

    async fn continue_search(&self, _current: &Bundle) -> Result<Bundle> {
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FhirError::SearchFailed("no pages".to_string()).into())
    }

    async fn convert_data(&self, request: ConvertDataRequest) -> Result<Bundle> {
        self.convert_requests.lock().unwrap().push(request);
        Ok(empty_bundle("transaction"))
    }

    async fn transaction(&self, bundle: Bundle) -> Result<Bundle> {
        self.transactions.lock().unwrap().push(bundle.clone());
        Ok(bundle)
    }
}

fn empty_bundle(bundle_type: &str) -> Bundle {
    serde_json::from_value(serde_json::json!({
        "resourceType": "Bundle",
        "type": bundle_type
    }))
    .unwrap()
}

fn page_of(numbers: &[&str]) -> Bundle {
    serde_json::from_value(serde_json::json!({
        "resourceType": "Bundle",
        "type": "searchset",
        "entry": numbers.iter().enumerate().map(|(i, number)| serde_json::json!({
            "resource": {
                "resourceType": "Patient",
                "id": format!("p{i}"),
                "identifier": [
                    { "system": "https://fhir.nhs.uk/Id/nhs-number", "value": number }
                ]
            }
        })).collect::<Vec<_>>()
    }))
    .unwrap()
}

fn message(id: &str, file_name: &str, content: &str) -> MeshMessage {
    let mut headers = HashMap::new();
    headers.insert("mex-filename".to_string(), file_name.to_string());
    MeshMessage {
        id: id.to_string(),
        headers,
        content: content.as_bytes().to_vec(),
    }
}

fn service_with(
    mesh: Arc<MockMesh>,
    fhir: Arc<MockFhir>,
    cache: Arc<InMemoryTrackingCache>,
) -> NdopService {
    NdopService::new(mesh, fhir, cache, PAGE_SIZE, TTL)
}

fn not_cancelled() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    std::mem::forget(tx);
    rx
}

#[tokio::test]
async fn test_send_remembers_batch_under_tracking_id() {
    let mesh = Arc::new(MockMesh::new());
    let fhir = Arc::new(MockFhir::with_pages(vec![page_of(&["9434765919"])]));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir, cache.clone());

    service.send_mesh_messages(&not_cancelled()).await.unwrap();

    assert_eq!(*mesh.sent.lock().unwrap(), vec!["9434765919,\n"]);
    let batch: Option<Vec<String>> = get_json(cache.as_ref(), "trk-0").await.unwrap();
    assert_eq!(batch, Some(vec!["9434765919".to_string()]));
}

#[tokio::test]
async fn test_send_skips_empty_page() {
    let mesh = Arc::new(MockMesh::new());
    let fhir = Arc::new(MockFhir::with_pages(vec![page_of(&[])]));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir, cache);

    service.send_mesh_messages(&not_cancelled()).await.unwrap();

    assert!(mesh.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_remembers_each_page_separately() {
    let mesh = Arc::new(MockMesh::new());
    let fhir = Arc::new(MockFhir::with_pages(vec![
        page_of(&["1111111111", "2222222222"]),
        page_of(&["3333333333"]),
    ]));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir, cache.clone());

    service.send_mesh_messages(&not_cancelled()).await.unwrap();

    assert_eq!(mesh.sent.lock().unwrap().len(), 2);
    let first: Option<Vec<String>> = get_json(cache.as_ref(), "trk-0").await.unwrap();
    let second: Option<Vec<String>> = get_json(cache.as_ref(), "trk-1").await.unwrap();
    assert_eq!(
        first,
        Some(vec!["1111111111".to_string(), "2222222222".to_string()])
    );
    assert_eq!(second, Some(vec!["3333333333".to_string()]));
}

#[tokio::test]
async fn test_retrieve_control_file_records_correlation() {
    let control = build_control_file("WF_NDOP", "X26TO1", "X26FROM1", "X26FROM1_abc");
    let mesh = Arc::new(MockMesh::with_inbox(vec![message(
        "msg-1",
        "NDOPREQ_20240101120000.ctl",
        &control,
    )]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir, cache.clone());

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    let tracking_id: Option<String> = get_json(cache.as_ref(), "NDOPREQ_20240101120000")
        .await
        .unwrap();
    assert_eq!(tracking_id, Some("X26FROM1_abc".to_string()));
    assert_eq!(*mesh.acknowledged.lock().unwrap(), vec!["msg-1"]);
}

#[tokio::test]
async fn test_retrieve_malformed_control_file_is_discarded() {
    let mesh = Arc::new(MockMesh::with_inbox(vec![message(
        "msg-1",
        "NDOPREQ_20240101120000.ctl",
        "<DTSControl><Version>1.0</Version></DTSControl>",
    )]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir, cache.clone());

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    // Nothing cached, but the message is still cleared from the inbox.
    let tracking_id: Option<String> = get_json(cache.as_ref(), "NDOPREQ_20240101120000")
        .await
        .unwrap();
    assert!(tracking_id.is_none());
    assert_eq!(*mesh.acknowledged.lock().unwrap(), vec!["msg-1"]);
}

#[tokio::test]
async fn test_retrieve_data_file_enriches_batch_and_commits() {
    let cache = Arc::new(InMemoryTrackingCache::new());
    put_json(
        cache.as_ref(),
        "NDOPREQ_20240101120000",
        &"trk-0".to_string(),
        TTL,
    )
    .await
    .unwrap();
    put_json(
        cache.as_ref(),
        "trk-0",
        &vec!["1111111111".to_string(), "2222222222".to_string()],
        TTL,
    )
    .await
    .unwrap();

    let mesh = Arc::new(MockMesh::with_inbox(vec![message(
        "msg-1",
        "NDOPREQ_20240101120000.dat",
        "1111111111,\n",
    )]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let service = service_with(mesh.clone(), fhir.clone(), cache);

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    let requests = fhir.convert_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let input: serde_json::Value = serde_json::from_str(&requests[0].input_data).unwrap();
    let consents = input["consents"].as_array().unwrap();
    assert_eq!(consents.len(), 2);
    assert_eq!(consents[0]["nhs_number"], "1111111111");
    assert_eq!(consents[0]["opted_out"], false);
    assert_eq!(consents[1]["nhs_number"], "2222222222");
    assert_eq!(consents[1]["opted_out"], true);

    assert_eq!(fhir.transactions.lock().unwrap().len(), 1);
    assert_eq!(*mesh.acknowledged.lock().unwrap(), vec!["msg-1"]);
}

#[tokio::test]
async fn test_retrieve_data_file_with_cache_miss_is_not_acknowledged() {
    let mesh = Arc::new(MockMesh::with_inbox(vec![message(
        "msg-1",
        "NDOPREQ_20240101120000.dat",
        "1111111111,\n",
    )]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir.clone(), cache);

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    // Left in the inbox for a later run, once the control file has arrived.
    assert!(fhir.convert_requests.lock().unwrap().is_empty());
    assert!(mesh.acknowledged.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_retrieve_control_then_data_in_one_run() {
    let control = build_control_file("WF_NDOP", "X26TO1", "X26FROM1", "trk-0");
    let cache = Arc::new(InMemoryTrackingCache::new());
    put_json(cache.as_ref(), "trk-0", &vec!["1111111111".to_string()], TTL)
        .await
        .unwrap();

    let mesh = Arc::new(MockMesh::with_inbox(vec![
        message("msg-1", "NDOPREQ_20240101120000.ctl", &control),
        message("msg-2", "NDOPREQ_20240101120000.dat", "1111111111,\n"),
    ]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let service = service_with(mesh.clone(), fhir.clone(), cache);

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    assert_eq!(fhir.transactions.lock().unwrap().len(), 1);
    assert_eq!(*mesh.acknowledged.lock().unwrap(), vec!["msg-1", "msg-2"]);
}

#[tokio::test]
async fn test_retrieve_trace_message_is_acknowledged_without_processing() {
    let mesh = Arc::new(MockMesh::with_inbox(vec![message(
        "msg-1",
        "NDOPREQ_20240101120000.rep",
        "delivery report",
    )]));
    let fhir = Arc::new(MockFhir::with_pages(Vec::new()));
    let cache = Arc::new(InMemoryTrackingCache::new());
    let service = service_with(mesh.clone(), fhir.clone(), cache);

    service
        .retrieve_mesh_messages(&not_cancelled())
        .await
        .unwrap();

    assert!(fhir.convert_requests.lock().unwrap().is_empty());
    assert_eq!(*mesh.acknowledged.lock().unwrap(), vec!["msg-1"]);
}
