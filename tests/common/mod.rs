use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use spacetraveling::app::{router, AppState};
use spacetraveling::settings::Settings;

pub const MASTER_REF: &str = "master-ref";
pub const DRAFT_REF: &str = "draft-ref";
pub const TEST_SECRET: &str = "an-integration-test-secret-of-sufficient-length";

/// Seven published posts, oldest first.
pub const PUBLISHED_UIDS: [&str; 7] = ["a", "b", "c", "d", "e", "f", "g"];

fn post(uid: &str, day: u32, title: &str, edited_day: Option<u32>) -> Value {
    let first = format!("2021-03-{day:02}T19:25:28+0000");
    let last = edited_day
        .map(|d| format!("2021-03-{d:02}T09:05:00+0000"))
        .unwrap_or_else(|| first.clone());
    json!({
        "id": format!("id-{uid}"),
        "uid": uid,
        "type": "posts",
        "first_publication_date": first,
        "last_publication_date": last,
        "data": {
            "title": title,
            "subtitle": format!("Sobre {uid}"),
            "author": "Ana",
            "banner": {"url": format!("https://images.example/{uid}.png")},
            "content": [{
                "heading": "Introdução",
                "body": [{"type": "paragraph", "text": "Lorem ipsum dolor sit amet"}]
            }]
        }
    })
}

fn published() -> Vec<Value> {
    PUBLISHED_UIDS
        .iter()
        .enumerate()
        .map(|(i, uid)| {
            let edited = (*uid == "c").then_some(25);
            post(uid, i as u32 + 1, &format!("Post {uid}"), edited)
        })
        .collect()
}

fn drafts() -> Vec<Value> {
    vec![
        post("b", 2, "Rascunho b", None),
        json!({"id": "id-home", "uid": "home", "type": "page", "data": {}}),
    ]
}

/// In-process stand-in for the Prismic REST API v2.
pub struct FakePrismic {
    base: String,
    published: Mutex<Vec<Value>>,
    drafts: Vec<Value>,
    pub search_hits: AtomicUsize,
}

impl FakePrismic {
    /// Add a document to the published revision.
    pub fn publish(&self, doc: Value) {
        self.published.lock().unwrap().push(doc);
    }

    fn published(&self) -> Vec<Value> {
        self.published.lock().unwrap().clone()
    }

    fn documents(&self, reference: &str) -> Option<Vec<Value>> {
        match reference {
            MASTER_REF => Some(self.published()),
            DRAFT_REF => {
                let mut docs = self.published();
                for draft in &self.drafts {
                    match docs.iter_mut().find(|doc| doc["id"] == draft["id"]) {
                        Some(doc) => *doc = draft.clone(),
                        None => docs.push(draft.clone()),
                    }
                }
                Some(docs)
            }
            _ => None,
        }
    }
}

/// `(path, value)` pairs of every `at(path, "value")` in a `q` parameter.
fn parse_predicates(q: &str) -> Vec<(String, String)> {
    q.split("[at(")
        .skip(1)
        .filter_map(|part| {
            let (path, rest) = part.split_once(", \"")?;
            let (value, _) = rest.split_once("\")]")?;
            Some((path.to_string(), value.to_string()))
        })
        .collect()
}

fn matches(doc: &Value, path: &str, value: &str) -> bool {
    match path {
        "document.type" => doc["type"] == value,
        "document.id" => doc["id"] == value,
        _ => match path.strip_prefix("my.").and_then(|p| p.strip_suffix(".uid")) {
            Some(doc_type) => doc["type"] == doc_type && doc["uid"] == value,
            None => false,
        },
    }
}

async fn api_root() -> Json<Value> {
    Json(json!({
        "refs": [{"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}]
    }))
}

async fn search(
    State(fake): State<Arc<FakePrismic>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.search_hits.fetch_add(1, Ordering::SeqCst);

    let reference = params.get("ref").map(String::as_str).unwrap_or_default();
    let Some(mut docs) = fake.documents(reference) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Ref not found"})),
        )
            .into_response();
    };

    let q = params.get("q").cloned().unwrap_or_default();
    for (path, value) in parse_predicates(&q) {
        docs.retain(|doc| matches(doc, &path, &value));
    }

    if let Some(orderings) = params.get("orderings") {
        let descending = orderings.contains(" desc");
        docs.sort_by(|a, b| {
            let (a, b) = (
                a["first_publication_date"].as_str().unwrap_or_default(),
                b["first_publication_date"].as_str().unwrap_or_default(),
            );
            if descending { b.cmp(a) } else { a.cmp(b) }
        });
    }

    if let Some(after) = params.get("after") {
        if let Some(pos) = docs.iter().position(|doc| doc["id"] == after.as_str()) {
            docs = docs.split_off(pos + 1);
        }
    }

    let page_size: usize = params.get("pageSize").and_then(|s| s.parse().ok()).unwrap_or(20);
    let page: usize = params.get("page").and_then(|s| s.parse().ok()).unwrap_or(1);
    let total = docs.len();
    let total_pages = total.div_ceil(page_size);
    let results: Vec<Value> = docs.into_iter().skip((page - 1) * page_size).take(page_size).collect();

    let next_page = (page < total_pages).then(|| {
        let mut next = params.clone();
        next.insert("page".to_string(), (page + 1).to_string());
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(next.iter())
            .finish();
        format!("{}/documents/search?{query}", fake.base)
    });

    Json(json!({
        "page": page,
        "results_per_page": page_size,
        "total_results_size": total,
        "total_pages": total_pages,
        "next_page": next_page,
        "prev_page": null,
        "results": results,
    }))
    .into_response()
}

/// Start the fake API on an ephemeral port. Returns it and its endpoint URL.
pub async fn start_fake_prismic() -> (Arc<FakePrismic>, String) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake content API");
    let addr = listener.local_addr().expect("Failed to read local address");
    let base = format!("http://{addr}/api/v2");

    let fake = Arc::new(FakePrismic {
        base: base.clone(),
        published: Mutex::new(published()),
        drafts: drafts(),
        search_hits: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/api/v2", get(api_root))
        .route("/api/v2/documents/search", get(search))
        .with_state(fake.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake content API failed");
    });

    (fake, base)
}

/// The application wired to a fake content API through the real client.
pub struct TestEnv {
    pub fake: Arc<FakePrismic>,
    pub state: AppState,
    pub router: Router,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut Settings)) -> Self {
        let (fake, endpoint) = start_fake_prismic().await;

        let mut settings = Settings::default();
        settings.prismic.endpoint = endpoint;
        settings.preview.secret = Some(TEST_SECRET.to_string());
        configure(&mut settings);
        settings.validate().expect("Invalid test settings");

        let state = AppState::from_settings(settings).expect("Failed to build AppState");
        let router = router(state.clone());

        Self {
            fake,
            state,
            router,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.clone())
    }

    pub fn search_hits(&self) -> usize {
        self.fake.search_hits.load(Ordering::SeqCst)
    }

    /// Activate preview for `DRAFT_REF` on `server`.
    pub async fn enter_preview(&self, server: &axum_test::TestServer, document_id: &str) {
        server
            .get("/api/preview")
            .add_query_param("token", DRAFT_REF)
            .add_query_param("documentId", document_id)
            .await
            .assert_status_ok();
    }
}
