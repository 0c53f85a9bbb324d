use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use toolstash::installer::{install_fn, InstallFn};
use toolstash::{ConfigResolver, InstallerBuilder, ProgressBarOpts};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Common test constants
pub const DEMO_FILENAME: &str = "demo-%s.bin";
pub const DEMO_URL_PATH: &str = "/%s/demo.bin";
pub const DEMO_BODY: &[u8] = b"demo artifact bytes";

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Writes a `toolsrc.<ext>` file into `dir`
pub fn write_config(dir: &Path, ext: &str, content: &str) -> PathBuf {
    create_temp_file(dir, &format!("toolsrc.{ext}"), content.as_bytes())
}

/// Asserts that a file exists and holds `expected`
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let content = fs::read(path).unwrap_or_else(|e| panic!("cannot read {path:?}: {e}"));
    assert_eq!(content, expected, "File content mismatch at path: {:?}", path);
}

/// Download URL template pointing at `server`
pub fn demo_url_template(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DEMO_URL_PATH)
}

/// Serves `body` for `GET /<version>/demo.bin`, expecting `calls` requests
pub async fn mount_demo(server: &MockServer, version: &str, body: &[u8], calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{version}/demo.bin")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(calls)
        .mount(server)
        .await;
}

/// Answers every request with `status`
pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Builder for the demo tool stored in `dir`, downloading from `server`
pub fn demo_builder(dir: &Path, server: &MockServer) -> InstallerBuilder {
    InstallerBuilder::new()
        .filename_template(DEMO_FILENAME)
        .download_url_template(demo_url_template(server))
        .download_dir(dir)
        .progress(ProgressBarOpts::hidden())
}

/// Resolver searching only `dir`
pub fn resolver_in(dir: &Path) -> ConfigResolver {
    ConfigResolver::builder()
        .dirs(vec![dir.to_path_buf()])
        .progress(ProgressBarOpts::hidden())
        .build()
}

/// Install function recording every path it is called with
#[derive(Clone, Default)]
pub struct RecordingInstall {
    pub calls: Arc<std::sync::Mutex<Vec<PathBuf>>>,
}

impl RecordingInstall {
    pub fn install_fn(&self) -> InstallFn {
        let calls = self.calls.clone();
        install_fn(move |path| {
            let calls = calls.clone();
            async move {
                calls.lock().unwrap().push(path);
                Ok(())
            }
        })
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

/// Shared counter for loaders and modules
#[derive(Clone, Default)]
pub struct Counter(pub Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
