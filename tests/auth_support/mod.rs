#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gauth::auth::{
    Credential, CredentialSink, CredentialStore, Interaction, OAuthEndpoints, StoreOptions,
};
use gauth::error::{GauthError, Result};
use gauth::transport::HttpTransport;
use wiremock::MockServer;

pub const TOKEN_PATH: &str = "/token";
pub const AUTH_PATH: &str = "/o/oauth2/auth";

#[derive(Default)]
pub struct InMemorySink {
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: AtomicBool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, location: &Path, contents: &str) {
        self.files
            .lock()
            .expect("sink lock poisoned")
            .insert(location.to_path_buf(), contents.to_string());
    }

    pub fn get(&self, location: &Path) -> Option<String> {
        self.files
            .lock()
            .expect("sink lock poisoned")
            .get(location)
            .cloned()
    }

    pub fn get_json(&self, location: &Path) -> Option<serde_json::Value> {
        self.get(location)
            .map(|raw| serde_json::from_str(&raw).expect("sink holds valid JSON"))
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl CredentialSink for InMemorySink {
    fn read(&self, location: &Path) -> Result<String> {
        self.get(location).ok_or_else(|| {
            GauthError::persistence(
                location,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such entry"),
            )
        })
    }

    fn write(&self, location: &Path, contents: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GauthError::persistence(
                location,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only sink"),
            ));
        }
        self.seed(location, contents);
        Ok(())
    }
}

/// Records every interaction and answers prompts with a fixed code.
pub struct ScriptedInteraction {
    code: String,
    browser_available: bool,
    pub opened: Mutex<Vec<String>>,
    pub shown: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn answering(code: &str) -> Self {
        Self {
            code: code.to_string(),
            browser_available: true,
            opened: Mutex::new(Vec::new()),
            shown: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn without_browser(mut self) -> Self {
        self.browser_available = false;
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("lock").clone()
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().expect("lock").clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn open_url(&self, url: &str) -> Result<()> {
        if !self.browser_available {
            return Err(GauthError::Interaction("no browser".to_string()));
        }
        self.opened.lock().expect("lock").push(url.to_string());
        Ok(())
    }

    async fn show(&self, message: &str) -> Result<()> {
        self.shown.lock().expect("lock").push(message.to_string());
        Ok(())
    }

    async fn read_line(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        Ok(format!("{}\n", self.code))
    }
}

pub fn endpoints(server: &MockServer) -> OAuthEndpoints {
    OAuthEndpoints::default()
        .with_authorization_url(format!("{}{AUTH_PATH}", server.uri()))
        .with_token_url(format!("{}{TOKEN_PATH}", server.uri()))
}

pub fn store_options(server: &MockServer, sink: Arc<InMemorySink>) -> StoreOptions {
    StoreOptions::builder()
        .sink(sink)
        .transport(Arc::new(HttpTransport::default()))
        .endpoints(endpoints(server))
        .build()
}

pub fn credential(location: &str, access_token: &str) -> Credential {
    Credential::new(
        "c1",
        "s1",
        vec!["a".to_string()],
        "u@x.com",
        location,
        access_token,
        "r1",
    )
    .expect("valid credential")
}

pub fn store(server: &MockServer, sink: Arc<InMemorySink>, access_token: &str) -> CredentialStore {
    CredentialStore::create_with(credential("creds.json", access_token), store_options(server, sink))
        .expect("create store")
}
