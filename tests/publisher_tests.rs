use barque_release::config::{DownloadCenterCredentials, ReleaseConfig};
use barque_release::download_center::{DESCRIPTOR_FILE_NAME, DownloadCenterPublisher, HttpDownloadCenter};
use barque_release::error::{GitHubError, ReleaseError};
use barque_release::github::{GitHubRepo, SourceHost};
use barque_release::homebrew::{HomebrewPublisher, HomebrewSettings, PackageManagerPublisher};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use sha2::{Digest, Sha256};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo(server: &MockServer, slug: &str) -> GitHubRepo {
    let (owner, name) = slug.split_once('/').unwrap();
    GitHubRepo::with_api_base(owner, name, "token", &server.uri()).unwrap()
}

fn tag(name: &str, sha: &str) -> serde_json::Value {
    json!({
        "name": name,
        "commit": { "sha": sha, "url": format!("https://api.github.com/commits/{}", sha) },
        "zipball_url": format!("https://api.github.com/zipball/{}", name),
        "tarball_url": format!("https://api.github.com/tarball/{}", name),
        "node_id": format!("node-{}", name),
    })
}

fn file(path: &str, content: &str, sha: &str) -> serde_json::Value {
    let api = format!("https://api.github.com/repos/contents/{}", path);
    json!({
        "type": "file",
        "encoding": "base64",
        "size": content.len(),
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "content": STANDARD.encode(content),
        "sha": sha,
        "url": api,
        "git_url": null,
        "html_url": null,
        "download_url": null,
        "_links": { "self": api, "git": null, "html": null },
    })
}

fn release_config(version: &str, dry_run: bool) -> ReleaseConfig {
    ReleaseConfig {
        version: version.to_string(),
        triggering_git_tag: Some(format!("v{}", version)),
        revision: "sha".to_string(),
        project: "mongosh".to_string(),
        package_name: "mongosh".to_string(),
        system_package_name: "mongodb-mongosh".to_string(),
        dry_run,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_most_recent_draft_tag_from_tag_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/mongosh/tags"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tag("v0.0.3-draft.2", "sha2"),
            tag("v0.0.3-draft.11", "sha11"),
            tag("v0.0.2", "old"),
        ])))
        .mount(&server)
        .await;

    let tag = repo(&server, "mongodb-js/mongosh")
        .most_recent_draft_tag("0.0.3")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tag.name, "v0.0.3-draft.11");
    assert_eq!(tag.sha, "sha11");
}

#[tokio::test]
async fn test_promote_release_publishes_draft() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/mongosh/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "tag_name": "v1.0.0", "draft": true, "html_url": "https://github.com/r/7" },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/repos/mongodb-js/mongosh/releases/7"))
        .and(body_partial_json(json!({ "draft": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    repo(&server, "mongodb-js/mongosh")
        .promote_release(&release_config("1.0.0", false))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_promote_release_leaves_public_release_alone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/mongosh/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "tag_name": "v1.0.0", "draft": false },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    repo(&server, "mongodb-js/mongosh")
        .promote_release(&release_config("1.0.0", false))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_promote_release_without_release_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/mongosh/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = repo(&server, "mongodb-js/mongosh")
        .promote_release(&release_config("1.0.0", false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReleaseError::GitHub(GitHubError::ReleaseNotFound { ref tag }) if tag == "v1.0.0"
    ));
}

#[tokio::test]
async fn test_download_center_merges_and_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mongosh.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [{ "_id": "0.9.0", "version": "0.9.0", "platform": [] }],
            "manual_link": "https://docs.mongodb.com/mongodb-shell/",
        })))
        .mount(&server)
        .await;
    let auth = format!("Basic {}", STANDARD.encode("key:secret"));
    Mock::given(method("PUT"))
        .and(path("/mongosh.json"))
        .and(header("authorization", auth.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let mut config = release_config("1.0.0", false);
    config.output_dir = output.path().to_path_buf();
    config.download_center = DownloadCenterCredentials {
        access_key_id: "key".to_string(),
        secret_access_key: "secret".to_string(),
    };

    HttpDownloadCenter::new(format!("{}/mongosh.json", server.uri()))
        .publish(&config)
        .await
        .unwrap();

    let written = std::fs::read_to_string(output.path().join(DESCRIPTOR_FILE_NAME)).unwrap();
    let descriptor: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(descriptor["versions"][0]["version"], "1.0.0");
    assert_eq!(descriptor["versions"][1]["version"], "0.9.0");
    assert_eq!(descriptor["manual_link"], "https://docs.mongodb.com/mongodb-shell/");
    assert_eq!(
        descriptor["release_notes_link"],
        "https://github.com/mongodb-js/mongosh/releases/tag/v1.0.0"
    );
}

#[tokio::test]
async fn test_download_center_replaces_same_major_under_custom_hosts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mongosh.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [{ "_id": "2.3.0", "version": "2.3.0", "platform": [] }],
            "release_notes_link": "https://github.com/acme/shell/releases/tag/v2.3.0",
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/mongosh.json"))
        .and(body_partial_json(json!({
            "release_notes_link": "https://github.com/acme/shell/releases/tag/v2.4.0",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let mut config = release_config("2.4.0", false);
    config.output_dir = output.path().to_path_buf();

    HttpDownloadCenter::new(format!("{}/mongosh.json", server.uri()))
        .with_download_base("https://downloads.example.com/shell/")
        .with_release_page_base("https://github.com/acme/shell/releases/tag")
        .publish(&config)
        .await
        .unwrap();

    let written = std::fs::read_to_string(output.path().join(DESCRIPTOR_FILE_NAME)).unwrap();
    let descriptor: serde_json::Value = serde_json::from_str(&written).unwrap();
    let versions = descriptor["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["version"], "2.4.0");
    let links: Vec<&str> = versions[0]["platform"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["download_link"].as_str().unwrap())
        .collect();
    assert!(!links.is_empty());
    assert!(links.iter().all(|l| l.starts_with("https://downloads.example.com/shell/")));
    assert!(links.iter().all(|l| l.contains("2.4.0") && !l.contains("shell//")));
}

#[tokio::test]
async fn test_download_center_dry_run_does_not_upload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mongosh.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = tempfile::tempdir().unwrap();
    let mut config = release_config("1.0.0", true);
    config.output_dir = output.path().to_path_buf();

    HttpDownloadCenter::new(format!("{}/mongosh.json", server.uri()))
        .publish(&config)
        .await
        .unwrap();
    let written = std::fs::read_to_string(output.path().join(DESCRIPTOR_FILE_NAME)).unwrap();
    let descriptor: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(descriptor["versions"][0]["version"], "1.0.0");
    assert_eq!(
        descriptor["manual_link"],
        "https://docs.mongodb.org/manual/products/mongosh"
    );
    assert_eq!(descriptor["previous_releases_link"], "");
}

const FORMULA: &str = r#"class Mongosh < Formula
  desc "MongoDB Shell"
  url "https://registry.npmjs.org/@mongosh/cli-repl/-/cli-repl-1.0.0.tgz"
  sha256 "aaaa"
end
"#;

#[tokio::test]
async fn test_homebrew_opens_pull_request_from_fork() {
    let server = MockServer::start().await;
    let tarball = b"tarball bytes".to_vec();
    let sha = hex::encode(Sha256::digest(&tarball));

    Mock::given(method("GET"))
        .and(path("/cli-repl-1.1.0.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tarball))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/Homebrew/homebrew-core/contents/Formula/m/mongosh.rb"))
        .and(query_param("ref", "master"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file("Formula/m/mongosh.rb", FORMULA, "core")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/homebrew-core/git/ref/heads/master"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "object": { "sha": "base" } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/mongodb-js/homebrew-core/git/refs"))
        .and(body_partial_json(json!({ "sha": "base" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/mongodb-js/homebrew-core/contents/Formula/m/mongosh.rb"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file("Formula/m/mongosh.rb", FORMULA, "fork")),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/mongodb-js/homebrew-core/contents/Formula/m/mongosh.rb"))
        .and(body_partial_json(json!({ "sha": "fork" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/Homebrew/homebrew-core/pulls"))
        .and(body_partial_json(json!({
            "title": "mongosh 1.1.0",
            "head": format!("mongodb-js:mongosh-1.1.0-{}", sha),
            "base": "master",
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "html_url": "https://github.com/Homebrew/homebrew-core/pull/1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settings = HomebrewSettings {
        tarball_url_template: format!("{}/cli-repl-{{version}}.tgz", server.uri()),
        ..Default::default()
    };
    let publisher = HomebrewPublisher::new(
        repo(&server, "Homebrew/homebrew-core"),
        repo(&server, "mongodb-js/homebrew-core"),
        settings,
    );

    publisher
        .publish(
            "1.1.0",
            "https://github.com/mongodb-js/mongosh/releases/tag/v1.1.0",
            false,
        )
        .await
        .unwrap();
}
