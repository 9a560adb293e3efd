//! Integration tests for the Gist filesystem adapter against a mocked
//! server.

use gist_storage::{
    FilesystemAdapter, GistAdapter, GistClient, GistConfig, GistErrorKind, Visibility,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_adapter(server: &MockServer) -> GistAdapter {
    let config = GistConfig::builder()
        .base_url(server.uri())
        .token("ghp_test")
        .gist_id("abc123")
        .description("Test gist")
        .build()
        .unwrap();
    GistAdapter::new(GistClient::new(config).unwrap())
}

fn gist_body(id: &str, files: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "html_url": format!("https://gist.github.com/{}", id),
        "public": false,
        "description": "Test gist",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-02T00:00:00Z",
        "files": files
    })
}

fn file_entry(server: &MockServer, name: &str, size: u64) -> serde_json::Value {
    json!({
        "filename": name,
        "type": "text/plain",
        "raw_url": format!("{}/raw/{}", server.uri(), name),
        "size": size
    })
}

#[tokio::test]
async fn exists_is_served_from_a_single_metadata_fetch() {
    let server = MockServer::start().await;

    let files = json!({ "hello.txt": file_entry(&server, "hello.txt", 13) });
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", files)))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    // Repeated queries hit the cache, not the server.
    assert!(adapter.file_exists("hello.txt").await.unwrap());
    assert!(!adapter.file_exists("missing.txt").await.unwrap());
    assert!(adapter.file_exists("hello.txt").await.unwrap());
}

#[tokio::test]
async fn read_selects_one_file_from_the_full_content_fetch() {
    let server = MockServer::start().await;

    let files = json!({
        "hello.txt": file_entry(&server, "hello.txt", 13),
        "other.txt": file_entry(&server, "other.txt", 5)
    });
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", files)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/hello.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello, World!"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/other.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("other"))
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);
    assert_eq!(adapter.read("hello.txt").await.unwrap(), "Hello, World!");

    let error = adapter.read("missing.txt").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn write_invalidates_cache_so_next_query_refetches() {
    let server = MockServer::start().await;

    // Before the write the gist is empty; after it the server knows the
    // file. The second metadata fetch only happens if the write dropped
    // the cached first listing.
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_json(json!({
            "files": { "hello.txt": { "content": "Hello, World!" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
            "abc123",
            json!({ "hello.txt": file_entry(&server, "hello.txt", 13) }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
            "abc123",
            json!({ "hello.txt": file_entry(&server, "hello.txt", 13) }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    assert!(!adapter.file_exists("hello.txt").await.unwrap());
    adapter.write("hello.txt", "Hello, World!").await.unwrap();
    assert!(adapter.file_exists("hello.txt").await.unwrap());

    let attributes = adapter.file_size("hello.txt").await.unwrap();
    assert_eq!(attributes.size, Some(13));
    assert_eq!(attributes.content_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn delete_sends_null_patch_and_invalidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
            "abc123",
            json!({ "old.txt": file_entry(&server, "old.txt", 3) }),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_json(json!({ "files": { "old.txt": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    assert!(adapter.file_exists("old.txt").await.unwrap());
    adapter.delete("old.txt").await.unwrap();
    assert!(!adapter.file_exists("old.txt").await.unwrap());
}

#[tokio::test]
async fn failed_write_still_drops_the_cached_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "Validation Failed" })),
        )
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    assert!(!adapter.file_exists("hello.txt").await.unwrap());

    let error = adapter.write("hello.txt", "contents").await.unwrap_err();
    assert_eq!(*error.kind(), GistErrorKind::UnprocessableEntity);
    assert_eq!(error.path(), Some("hello.txt"));

    // The next query refetches rather than serving the old snapshot.
    assert!(!adapter.file_exists("hello.txt").await.unwrap());
}

#[tokio::test]
async fn list_filters_by_directory_prefix() {
    let server = MockServer::start().await;

    let files = json!({
        "dir/a.txt": file_entry(&server, "dir/a.txt", 1),
        "dir/b.txt": file_entry(&server, "dir/b.txt", 2),
        "other.txt": file_entry(&server, "other.txt", 3)
    });
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", files)))
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    let mut all: Vec<_> = adapter
        .list_contents("", true)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    all.sort();
    assert_eq!(all, vec!["dir/a.txt", "dir/b.txt", "other.txt"]);

    let mut scoped: Vec<_> = adapter
        .list_contents("dir", false)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.path)
        .collect();
    scoped.sort();
    assert_eq!(scoped, vec!["dir/a.txt", "dir/b.txt"]);
}

#[tokio::test]
async fn list_degrades_to_empty_on_load_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })),
        )
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);

    // Enumeration swallows the load failure; other operations surface it.
    assert!(adapter.list_contents("", true).await.unwrap().is_empty());
    assert!(adapter.file_exists("hello.txt").await.is_err());
}

#[tokio::test]
async fn move_reads_writes_then_deletes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
            "abc123",
            json!({ "a.txt": file_entry(&server, "a.txt", 5) }),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("alpha"))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_json(json!({
            "files": { "b.txt": { "content": "alpha" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_json(json!({ "files": { "a.txt": null } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);
    adapter.move_file("a.txt", "b.txt").await.unwrap();
}

#[tokio::test]
async fn copy_leaves_the_source_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body(
            "abc123",
            json!({ "a.txt": file_entry(&server, "a.txt", 5) }),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("alpha"))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_json(json!({
            "files": { "b.txt": { "content": "alpha" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = test_adapter(&server);
    adapter.copy("a.txt", "b.txt").await.unwrap();
}

#[tokio::test]
async fn move_propagates_read_failure_without_writing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("abc123", json!({}))))
        .mount(&server)
        .await;

    // No PATCH mock mounted: any write attempt would fail the test
    // through an unexpected-request 404.
    let adapter = test_adapter(&server);
    let error = adapter.move_file("missing.txt", "b.txt").await.unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn directory_and_visibility_operations_are_not_supported() {
    let server = MockServer::start().await;
    let adapter = test_adapter(&server);

    assert!(!adapter.directory_exists("dir").await.unwrap());
    assert!(adapter.create_directory("dir").await.unwrap_err().is_not_supported());
    assert!(adapter.delete_directory("dir").await.unwrap_err().is_not_supported());
    assert!(adapter
        .set_visibility("a.txt", Visibility::Public)
        .await
        .unwrap_err()
        .is_not_supported());
    assert!(adapter.visibility("a.txt").await.unwrap_err().is_not_supported());
    assert!(adapter.last_modified("a.txt").await.unwrap_err().is_not_supported());

    // None of these touched the server.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn auto_create_assigns_the_gist_id_exactly_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/gists"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(gist_body(
                "new123",
                json!({ "welcome.txt": { "filename": "welcome.txt", "size": 6 } }),
            )),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/gists/new123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gist_body("new123", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let config = GistConfig::builder()
        .base_url(server.uri())
        .token("ghp_test")
        .auto_create(true)
        .description("Auto-created gist")
        .build()
        .unwrap();
    let adapter = GistAdapter::new(GistClient::new(config).unwrap());

    // Nothing exists before the first write, and no network is needed to
    // know that.
    assert!(adapter.gist_id().await.is_none());
    assert!(!adapter.file_exists("welcome.txt").await.unwrap());

    adapter.write("welcome.txt", "hello!").await.unwrap();
    assert_eq!(adapter.gist_id().await.as_deref(), Some("new123"));

    // The second write patches the now-existing gist instead of creating
    // another one.
    adapter.write("more.txt", "again").await.unwrap();
    assert_eq!(adapter.gist_id().await.as_deref(), Some("new123"));
}

#[tokio::test]
async fn missing_gist_id_without_auto_create_fails_before_any_network_call() {
    let server = MockServer::start().await;

    let result = GistConfig::builder()
        .base_url(server.uri())
        .token("ghp_test")
        .build();

    let error = result.unwrap_err();
    assert_eq!(*error.kind(), GistErrorKind::MissingGistId);
    assert!(error.is_configuration());
    assert!(server.received_requests().await.unwrap().is_empty());
}
