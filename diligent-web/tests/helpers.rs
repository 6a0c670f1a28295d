//! Shared setup for the HTTP integration tests
//!
//! The app runs against a fixture directory and the in-memory store; requests
//! are driven through the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
    response::Response,
    Router,
};
use diligent_core::{
    directory::{
        fixture::FixtureEntry, FixtureDirectory, DISTINGUISHED_NAME, GIVEN_NAME, MEMBERSHIPS,
        SURNAME, TITLE,
    },
    Credentials, DiligentConfig, DirectoryAttributes, DirectoryClient, DirectoryError,
    MemoryStore,
};
use diligent_web::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PLUGIN_BYTES: &[u8] = b"PK\x03\x04diligent-plugin";

/// Accounts known to the test directory, all with password `secret`
pub fn fixture_directory() -> FixtureDirectory {
    let mut directory = FixtureDirectory::default();
    directory.insert(
        "jdoe",
        FixtureEntry::default()
            .with_password("secret")
            .with_attribute(TITLE, &["Undergraduate"])
            .with_attribute(GIVEN_NAME, &["John"])
            .with_attribute(SURNAME, &["Doe"])
            .with_attribute(DISTINGUISHED_NAME, &["CN=jdoe,OU=doc,OU=Users,DC=ic,DC=ac,DC=uk"])
            .with_attribute(MEMBERSHIPS, &["CN=doc-all-students,OU=Groups,DC=ic,DC=ac,DC=uk"]),
    );
    directory.insert(
        "asmith",
        FixtureEntry::default()
            .with_password("secret")
            .with_attribute(TITLE, &["Postgraduate"])
            .with_attribute(GIVEN_NAME, &["Alice"])
            .with_attribute(SURNAME, &["Smith"])
            .with_attribute(DISTINGUISHED_NAME, &["CN=asmith,OU=doc,OU=Users,DC=ic,DC=ac,DC=uk"]),
    );
    directory.insert(
        "lecturer",
        FixtureEntry::default()
            .with_password("secret")
            .with_attribute(TITLE, &["Senior Lecturer"])
            .with_attribute(GIVEN_NAME, &["Ada"])
            .with_attribute(
                DISTINGUISHED_NAME,
                &["CN=lecturer,OU=mech,OU=Users,DC=ic,DC=ac,DC=uk"],
            )
            .with_attribute(
                MEMBERSHIPS,
                &[
                    "CN=mech-staff,OU=Groups,DC=ic,DC=ac,DC=uk",
                    "CN=doc-staff-group,OU=Groups,DC=ic,DC=ac,DC=uk",
                ],
            ),
    );
    directory.insert(
        "outsider",
        FixtureEntry::default()
            .with_password("secret")
            .with_attribute(TITLE, &["Undergraduate"])
            .with_attribute(
                DISTINGUISHED_NAME,
                &["CN=outsider,OU=chem,OU=Users,DC=ic,DC=ac,DC=uk"],
            )
            .with_attribute(MEMBERSHIPS, &["CN=chem-all-students,OU=Groups,DC=ic,DC=ac,DC=uk"]),
    );
    directory.insert(
        "nameless",
        FixtureEntry::default()
            .with_password("secret")
            .with_attribute(
                DISTINGUISHED_NAME,
                &["CN=nameless,OU=doc,OU=Users,DC=ic,DC=ac,DC=uk"],
            ),
    );
    directory
}

/// Directory wrapper that counts login attempts reaching it
pub struct CountingDirectory {
    inner: Arc<dyn DirectoryClient>,
    pub calls: AtomicUsize,
}

impl CountingDirectory {
    pub fn new(inner: Arc<dyn DirectoryClient>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryClient for CountingDirectory {
    async fn login(
        &self,
        credentials: &Credentials,
        requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.login(credentials, requested).await
    }
}

/// Directory whose server never answers
pub struct UnreachableDirectory;

#[async_trait]
impl DirectoryClient for UnreachableDirectory {
    async fn login(
        &self,
        _credentials: &Credentials,
        _requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        Err(DirectoryError::Connection("connection refused".to_string()))
    }
}

/// Directory that accepts the bind but has no entry for the account
pub struct MissingEntryDirectory;

#[async_trait]
impl DirectoryClient for MissingEntryDirectory {
    async fn login(
        &self,
        _credentials: &Credentials,
        _requested: &[&str],
    ) -> Result<DirectoryAttributes, DirectoryError> {
        Err(DirectoryError::NotFound)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub directory: Arc<CountingDirectory>,
    pub state: AppState,
    _files: TempDir,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(fixture_directory()), WebConfig::default())
}

pub fn spawn_app_with(directory: Arc<dyn DirectoryClient>, config: WebConfig) -> TestApp {
    let files = tempfile::tempdir().unwrap();
    let archive_path = files.path().join("diligent-1.0.0.zip");
    std::fs::write(&archive_path, PLUGIN_BYTES).unwrap();

    let mut settings = DiligentConfig::default();
    settings.session.secret = "integration-test-secret".to_string();
    settings.plugin.archive_path = archive_path;

    let directory = Arc::new(CountingDirectory::new(directory));
    let store = MemoryStore::new();
    let state = AppState::with_parts(config, settings, directory.clone(), store.clone());

    TestApp {
        router: create_app(state.clone()),
        store,
        directory,
        state,
        _files: files,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the JSON response body (`Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        (status, extract_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/api/login",
            None,
            json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Log in with the fixture password and return the access token
    pub async fn access_token(&self, username: &str) -> String {
        let (status, body) = self.login(username, "secret").await;
        assert_eq!(status, StatusCode::OK, "login failed for {}: {}", username, body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Store a configuration through the API and return its id
    pub async fn create_config(&self, token: &str, body: Value) -> String {
        let (status, response) = self
            .post("/api/configuration/new_config", Some(token), body)
            .await;
        assert_eq!(status, StatusCode::OK, "new_config failed: {}", response);
        response["id"].as_str().unwrap().to_string()
    }
}

pub async fn extract_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn extract_json(response: Response) -> Value {
    let bytes = extract_bytes(response).await;
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}
