//! Tests for finding, parsing and caching tool configuration.

use std::collections::HashMap;
use std::path::Path;
use toolstash::config::{InstallFnRegistry, ModuleLoader, StaticModule};
use toolstash::installer::{FilenameRule, InstallerOptions, UrlRule};
use toolstash::{ConfigResolver, Error, ProgressBarOpts, ToolConfigRecord};
use wiremock::MockServer;

mod common;
use common::helpers::*;

/// Module loader counting how often it is asked for options.
struct CountingModule {
    loads: Counter,
    module: StaticModule,
}

impl ModuleLoader for CountingModule {
    fn load(&self, path: &Path) -> toolstash::Result<HashMap<String, InstallerOptions>> {
        self.loads.bump();
        self.module.load(path)
    }
}

fn demo_yaml(dir: &Path, server: &MockServer) -> String {
    format!(
        "demo:\n  filenameFmt: {DEMO_FILENAME}\n  downloadURLFmt: {}\n  downloadDir: '{}'\n",
        demo_url_template(server),
        dir.display()
    )
}

#[tokio::test]
async fn test_yaml_config_end_to_end() {
    let server = MockServer::start().await;
    mount_demo(&server, "3.2", DEMO_BODY, 1).await;
    let dir = create_temp_dir();
    write_config(dir.path(), "yml", &demo_yaml(dir.path(), &server));

    let resolver = resolver_in(dir.path());
    let installer = resolver
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();
    let path = installer.download("3.2").await.unwrap();

    assert_eq!(path, dir.path().join("demo-3.2.bin"));
    assert_file_content(&path, DEMO_BODY);
    assert_eq!(
        resolver.config_path(true).await.unwrap(),
        dir.path().join("toolsrc.yml")
    );
}

#[tokio::test]
async fn test_toml_and_json_configs() {
    let dir = create_temp_dir();
    write_config(
        dir.path(),
        "toml",
        "[demo]\nfilename = \"demo-%s.bin\"\nversionFmt = \"#.#\"\n",
    );
    let installer = resolver_in(dir.path())
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();
    assert_eq!(installer.filename("2"), "demo-2.0.bin");

    let dir = create_temp_dir();
    write_config(
        dir.path(),
        "json",
        r#"{ "demo": { "filename": "demo-%s.zip", "cache": false } }"#,
    );
    let installer = resolver_in(dir.path())
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();
    assert_eq!(installer.filename("2"), "demo-2.zip");
    assert!(!installer.cache());
}

#[tokio::test]
async fn test_extension_precedence() {
    let dir = create_temp_dir();
    write_config(dir.path(), "json", r#"{ "fromjson": { "filename": "j-%s" } }"#);
    write_config(dir.path(), "yaml", "fromyaml:\n  filename: y-%s\n");

    let tools = resolver_in(dir.path()).tools(true).await.unwrap();
    assert_eq!(tools, vec!["fromyaml".to_string()]);
}

#[tokio::test]
async fn test_first_directory_wins() {
    let first = create_temp_dir();
    let second = create_temp_dir();
    write_config(second.path(), "yml", "second:\n  filename: s-%s\n");

    let resolver = ConfigResolver::builder()
        .dirs(vec![first.path().to_path_buf(), second.path().to_path_buf()])
        .build();
    assert_eq!(resolver.tools(true).await.unwrap(), vec!["second".to_string()]);

    write_config(first.path(), "toml", "[first]\nfilename = \"f-%s\"\n");
    assert_eq!(resolver.tools(false).await.unwrap(), vec!["first".to_string()]);
}

#[tokio::test]
async fn test_overrides_take_precedence() {
    let dir = create_temp_dir();
    let downloads = dir.path().join("downloads");
    write_config(
        dir.path(),
        "yml",
        &format!(
            "demo:\n  filename: demo-%s.bin\n  cache: true\n  downloadDir: '{}'\n",
            downloads.display()
        ),
    );

    let overrides = ToolConfigRecord {
        filename: Some("other-%s.bin".into()),
        cache: Some(false),
        ..Default::default()
    };
    let installer = resolver_in(dir.path())
        .get("demo", &overrides, true)
        .await
        .unwrap();

    assert_eq!(installer.filename("1"), "other-1.bin");
    assert!(!installer.cache());
    assert_eq!(installer.download_dir(), downloads.as_path());
}

#[tokio::test]
async fn test_overrides_alone_configure_tool() {
    let dir = create_temp_dir();
    let overrides = ToolConfigRecord {
        filename: Some("solo-%s".into()),
        ..Default::default()
    };

    let installer = resolver_in(dir.path())
        .get("solo", &overrides, true)
        .await
        .unwrap();
    assert_eq!(installer.filename("9"), "solo-9");
}

#[tokio::test]
async fn test_unknown_tool() {
    let dir = create_temp_dir();
    write_config(dir.path(), "yml", "demo:\n  filename: demo-%s\n");

    let err = resolver_in(dir.path())
        .get("other", &ToolConfigRecord::default(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ToolNotConfigured(tool) if tool == "other"));
}

#[tokio::test]
async fn test_unknown_key_is_invalid_config() {
    let dir = create_temp_dir();
    write_config(dir.path(), "yml", "demo:\n  filename: demo-%s\n  mirror: x\n");

    let err = resolver_in(dir.path()).options(true).await.unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_concurrent_first_calls_load_once() {
    let dir = create_temp_dir();
    write_config(dir.path(), "mod", "");
    let loads = Counter::default();
    let module = StaticModule::new().tool(
        "demo",
        InstallerOptions {
            filename: Some(FilenameRule::function(|v| format!("demo_{v}"))),
            ..Default::default()
        },
    );

    let resolver = ConfigResolver::builder()
        .dirs(vec![dir.path().to_path_buf()])
        .module(
            "mod",
            CountingModule {
                loads: loads.clone(),
                module,
            },
        )
        .build();

    let other = resolver.clone();
    let (a, b, c) = tokio::join!(
        resolver.options(true),
        resolver.options(true),
        other.options(true)
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert!(std::sync::Arc::ptr_eq(&a, &c));
    assert_eq!(loads.get(), 1);

    resolver.options(true).await.unwrap();
    assert_eq!(loads.get(), 1);

    resolver.options(false).await.unwrap();
    assert_eq!(loads.get(), 2);
}

#[tokio::test]
async fn test_use_cache_false_rereads_file() {
    let dir = create_temp_dir();
    write_config(dir.path(), "yml", "before:\n  filename: b-%s\n");
    let resolver = resolver_in(dir.path());
    assert_eq!(resolver.tools(true).await.unwrap(), vec!["before".to_string()]);

    write_config(dir.path(), "yml", "after:\n  filename: a-%s\n");
    assert_eq!(resolver.tools(true).await.unwrap(), vec!["before".to_string()]);
    assert_eq!(resolver.tools(false).await.unwrap(), vec!["after".to_string()]);
    assert_eq!(resolver.tools(true).await.unwrap(), vec!["after".to_string()]);
}

#[tokio::test]
async fn test_module_source_with_live_functions() {
    let server = MockServer::start().await;
    mount_demo(&server, "1.2", DEMO_BODY, 1).await;
    let dir = create_temp_dir();
    write_config(dir.path(), "mod", "");
    let recorder = RecordingInstall::default();

    let uri = server.uri();
    let module = StaticModule::new().tool(
        "demo",
        InstallerOptions {
            filename: Some(FilenameRule::function(|v| format!("demo_{v}.bin"))),
            version: Some(std::sync::Arc::new(|name: &str| {
                name.strip_prefix("demo_")?.strip_suffix(".bin").map(String::from)
            })),
            download_url: Some(UrlRule::function(move |v| format!("{uri}/{v}/demo.bin"))),
            download_dir: Some(dir.path().to_path_buf()),
            install_fn: Some(recorder.install_fn()),
            ..Default::default()
        },
    );
    let resolver = ConfigResolver::builder()
        .dirs(vec![dir.path().to_path_buf()])
        .module("mod", module)
        .progress(ProgressBarOpts::hidden())
        .build();

    let installer = resolver
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();
    installer.install(Some("1.2"), true).await.unwrap();

    assert_eq!(recorder.calls(), vec![dir.path().join("demo_1.2.bin")]);
    assert_eq!(installer.downloaded().await.unwrap(), vec!["1.2".to_string()]);
}

#[tokio::test]
async fn test_install_fn_resolves_against_config_dir() {
    let dir = create_temp_dir();
    create_temp_file(dir.path(), "demo-1.0.bin", DEMO_BODY);
    write_config(
        dir.path(),
        "yml",
        &format!(
            "demo:\n  filename: demo-%s.bin\n  downloadDir: '{}'\n  installFn: hooks/install.sh#user\n",
            dir.path().display()
        ),
    );
    let recorder = RecordingInstall::default();
    let registry = InstallFnRegistry::new().register(
        dir.path().join("hooks/install.sh"),
        "user",
        recorder.install_fn(),
    );

    let resolver = ConfigResolver::builder()
        .dirs(vec![dir.path().to_path_buf()])
        .install_fn_loader(registry)
        .build();
    let installer = resolver
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();
    installer.install(None, false).await.unwrap();

    assert_eq!(recorder.calls(), vec![dir.path().join("demo-1.0.bin")]);
}

#[tokio::test]
async fn test_unregistered_install_fn_fails_loading() {
    let dir = create_temp_dir();
    write_config(
        dir.path(),
        "yml",
        "demo:\n  filename: demo-%s.bin\n  installFn: hooks/install.sh#missing\n",
    );
    let resolver = ConfigResolver::builder()
        .dirs(vec![dir.path().to_path_buf()])
        .install_fn_loader(InstallFnRegistry::new())
        .build();

    assert!(matches!(
        resolver.options(true).await,
        Err(Error::InstallFnNotCallable { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_script_install_fn() {
    use std::os::unix::fs::PermissionsExt;

    let dir = create_temp_dir();
    create_temp_file(dir.path(), "demo-1.0.bin", DEMO_BODY);
    create_temp_file(dir.path(), "demo-2.0.bin", DEMO_BODY);
    let script = create_temp_file(
        dir.path(),
        "install.sh",
        b"#!/bin/sh\ncase \"$2\" in *2.0*) exit 3 ;; esac\necho \"$1 $2\" > \"$(dirname \"$0\")/ran.txt\"\n",
    );
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    write_config(
        dir.path(),
        "yml",
        &format!(
            "demo:\n  filename: demo-%s.bin\n  downloadDir: '{}'\n  installFn: install.sh#user\n",
            dir.path().display()
        ),
    );

    let installer = resolver_in(dir.path())
        .get("demo", &ToolConfigRecord::default(), true)
        .await
        .unwrap();

    installer.install(Some("1.0"), false).await.unwrap();
    let ran = std::fs::read_to_string(dir.path().join("ran.txt")).unwrap();
    assert_eq!(
        ran.trim(),
        format!("user {}", dir.path().join("demo-1.0.bin").display())
    );

    match installer.install(Some("2.0"), false).await {
        Err(Error::InstallScriptFailed { path, status }) => {
            assert_eq!(path, script);
            assert_eq!(status.code(), Some(3));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
