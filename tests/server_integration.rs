use product_catalog::config::Config;
use product_catalog::server::run_server;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const LISTINGS_CSV: &str = "Model No,Model Name,Vendor Name,Category,Tags,PricePerPiece,Pictures
M1,Widget,Acme,Tools,\"red, blue\",9.5,widget.png
M2,Gadget,Globex,Tools,red,25,gadget.png
";

struct TestServer {
    _tmp: TempDir,
    base: String,
    upload_dir: PathBuf,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    client: reqwest::Client,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn find_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(client: &reqwest::Client, base: &str) {
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/health", base)).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server at {} did not come up", base);
}

async fn start_server() -> TestServer {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let port = find_free_port();

    let static_dir = root.join("public");
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join("products.html"), "<h1>products</h1>").unwrap();
    fs::write(root.join("index.html"), "<h1>upload</h1>").unwrap();

    let upload_dir = root.join("uploads");
    let config: Config = toml::from_str(&format!(
        r#"[db]
path = "{root}/data/catalog.sqlite"

[server]
bind = "127.0.0.1:{port}"
static_dir = "{root}/public"
index_file = "{root}/index.html"

[upload]
dir = "{root}/uploads"
"#,
        root = root.display(),
        port = port
    ))
    .unwrap();

    let handle = tokio::spawn(async move { run_server(&config).await });
    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    wait_for_server(&client, &base).await;

    TestServer {
        _tmp: tmp,
        base,
        upload_dir,
        handle,
        client,
    }
}

fn spooled_files(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

async fn upload(server: &TestServer, csv: &str) -> (StatusCode, String) {
    let part = Part::bytes(csv.as_bytes().to_vec())
        .file_name("listings.csv")
        .mime_str("text/csv")
        .unwrap();
    let form = Form::new().part("csvFile", part);
    let resp = server
        .client
        .post(format!("{}/upload-csv", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.text().await.unwrap())
}

async fn filter(server: &TestServer, body: Value) -> Vec<Value> {
    let resp = server
        .client
        .post(format!("{}/api/filter-listings", server.base))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

fn models(listings: &[Value]) -> Vec<&str> {
    listings
        .iter()
        .map(|l| l["Model No"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_upload_then_list() {
    let server = start_server().await;

    let (status, body) = upload(&server, LISTINGS_CSV).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    assert!(body.contains("data inserted"));
    assert_eq!(spooled_files(&server.upload_dir), 0, "processed upload must be deleted");

    let listings: Vec<Value> = server
        .client
        .get(format!("{}/api/listings", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(models(&listings), vec!["M1", "M2"]);

    let widget = &listings[0];
    assert_eq!(widget["Model Name"], "Widget");
    assert_eq!(widget["Vendor Name"], "Acme");
    assert_eq!(widget["Category"], "Tools");
    assert_eq!(widget["Tags"], json!(["red", "blue"]));
    assert_eq!(widget["PricePerPiece"], 9.5);
    assert_eq!(widget["Pictures"], "widget.png");
    assert!(widget["_id"].is_string());
}

#[tokio::test]
async fn test_malformed_upload_keeps_file_and_stores_nothing() {
    let server = start_server().await;

    let (status, body) = upload(
        &server,
        "Model No,Model Name,Vendor Name,Category,Tags,PricePerPiece,Pictures\n\
         M1,Widget,Acme,Tools,red,1,w.png\n\
         M2,Gadget\n",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("line 3"), "got: {}", body);
    assert_eq!(spooled_files(&server.upload_dir), 1, "failed upload must be retained");

    assert!(filter(&server, json!({})).await.is_empty());
}

#[tokio::test]
async fn test_upload_without_csv_field_is_rejected() {
    let server = start_server().await;

    let form = Form::new().text("note", "no file here");
    let resp = server
        .client
        .post(format!("{}/upload-csv", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("csvFile"));
}

#[tokio::test]
async fn test_filters_endpoint() {
    let server = start_server().await;

    let empty: Value = server
        .client
        .get(format!("{}/api/filters", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty, json!({ "vendors": [], "categories": [], "tags": [] }));

    upload(&server, LISTINGS_CSV).await;
    let facets: Value = server
        .client
        .get(format!("{}/api/filters", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(facets["vendors"], json!(["Acme", "Globex"]));
    assert_eq!(facets["categories"], json!(["Tools"]));
    assert_eq!(facets["tags"], json!(["blue", "red"]));
}

#[tokio::test]
async fn test_filter_listings_semantics() {
    let server = start_server().await;
    upload(&server, LISTINGS_CSV).await;

    assert_eq!(models(&filter(&server, json!({})).await), vec!["M1", "M2"]);
    assert_eq!(
        models(&filter(&server, json!({ "tags": ["red", "blue"] })).await),
        vec!["M1"]
    );
    assert!(filter(&server, json!({ "tags": ["red", "green"] })).await.is_empty());
    assert_eq!(
        models(&filter(&server, json!({ "minPrice": 10 })).await),
        vec!["M2"]
    );
    assert_eq!(
        models(&filter(&server, json!({ "minPrice": 9.5, "maxPrice": 9.5 })).await),
        vec!["M1"]
    );
    assert_eq!(
        models(&filter(&server, json!({ "vendors": ["Globex", "Initech"] })).await),
        vec!["M2"]
    );
    assert_eq!(
        models(&filter(&server, json!({ "vendors": [], "categories": ["Tools"] })).await),
        vec!["M1", "M2"]
    );
    assert!(filter(&server, json!({ "minPrice": 30, "maxPrice": 10 })).await.is_empty());
}

#[tokio::test]
async fn test_filter_listings_body_handling() {
    let server = start_server().await;
    upload(&server, LISTINGS_CSV).await;

    let resp = server
        .client
        .post(format!("{}/api/filter-listings", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let all: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(all.len(), 2);

    let resp = server
        .client
        .post(format!("{}/api/filter-listings", server.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid filter request" }));
}

#[tokio::test]
async fn test_root_and_static_files() {
    let server = start_server().await;

    let root = server
        .client
        .get(format!("{}/", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.text().await.unwrap(), "Welcome to the Product Listing API.");

    let index = server
        .client
        .get(format!("{}/index.html", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert!(index.text().await.unwrap().contains("upload"));

    let page = server
        .client
        .get(format!("{}/products.html", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("products"));

    let missing = server
        .client
        .get(format!("{}/nope.html", server.base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
