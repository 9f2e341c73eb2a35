use std::path::Path;

use url::Url;

use crate::{
    error::ShellError,
    static_server::{self, StaticServerHandle},
    APP_DISPLAY_NAME, MAIN_WINDOW_BACKGROUND, MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL,
    MAIN_WINDOW_WIDTH,
};

/// Everything a native window needs at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub label: String,
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub background: (u8, u8, u8),
    pub deny_new_windows: bool,
    pub open_devtools: bool,
    pub browser_args: Option<String>,
}

impl WindowSpec {
    pub fn main(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            title: APP_DISPLAY_NAME.to_string(),
            width: MAIN_WINDOW_WIDTH,
            height: MAIN_WINDOW_HEIGHT,
            background: MAIN_WINDOW_BACKGROUND,
            deny_new_windows: true,
            open_devtools: false,
            browser_args: None,
        }
    }
}

/// `main` for the first window, `main-2`, `main-3`, ... afterwards.
pub fn window_label(sequence: usize) -> String {
    if sequence <= 1 {
        MAIN_WINDOW_LABEL.to_string()
    } else {
        format!("{MAIN_WINDOW_LABEL}-{sequence}")
    }
}

pub trait WindowSurface {
    fn load_url(&self, url: &Url) -> Result<(), String>;

    /// Tears the window down after a failed attach so nothing half-built stays visible.
    fn discard(&self);
}

pub trait WindowFactory {
    type Surface: WindowSurface;

    fn create_window(&self, spec: &WindowSpec) -> Result<Self::Surface, String>;
}

/// Ownership record for one attached window.
#[derive(Debug)]
pub struct HostedWindow<S> {
    pub label: String,
    pub surface: S,
    pub port: u16,
    pub url: Url,
    /// Present when this creation started its own server.
    pub server: Option<StaticServerHandle>,
}

fn local_url(port: u16) -> Result<Url, ShellError> {
    let raw = static_server::local_origin_url(port);
    Url::parse(&raw).map_err(|error| ShellError::Load {
        url: raw,
        reason: error.to_string(),
    })
}

/// Creates a window, starts (or reuses) a local server for `web_root` and
/// points the window at it, strictly in that order.
///
/// Any failure discards the window and stops a server started here.
pub async fn open_hosted_window<W, F>(
    factory: &W,
    spec: &WindowSpec,
    web_root: &Path,
    reuse_port: Option<u16>,
    log: F,
) -> Result<HostedWindow<W::Surface>, ShellError>
where
    W: WindowFactory,
    F: Fn(&str) + Clone + Send + Sync + 'static,
{
    let surface = factory
        .create_window(spec)
        .map_err(|reason| ShellError::WindowCreate {
            label: spec.label.clone(),
            reason,
        })?;

    let (port, mut server) = match reuse_port {
        Some(port) => {
            log(&format!(
                "window {} reuses local web server on port {port}",
                spec.label
            ));
            (port, None)
        }
        None => match static_server::start_static_server(web_root.to_path_buf(), log.clone()).await
        {
            Ok(server) => (server.port(), Some(server)),
            Err(error) => {
                surface.discard();
                return Err(error);
            }
        },
    };

    let url = match local_url(port) {
        Ok(url) => url,
        Err(error) => {
            surface.discard();
            return Err(error);
        }
    };
    log(&format!("serving {} at {url}", web_root.display()));

    if let Err(reason) = surface.load_url(&url) {
        surface.discard();
        if let Some(server) = server.as_mut() {
            server.stop();
        }
        return Err(ShellError::Load {
            url: url.to_string(),
            reason,
        });
    }

    Ok(HostedWindow {
        label: spec.label.clone(),
        surface,
        port,
        url,
        server,
    })
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        startup_mode::PackagingMode,
        webui_paths::resolve_web_root,
    };

    #[derive(Debug, Default)]
    struct Recorded {
        created: Vec<WindowSpec>,
        loaded: Vec<Url>,
        discarded: usize,
    }

    #[derive(Clone, Default)]
    struct FakeFactory {
        recorded: Arc<Mutex<Recorded>>,
        fail_create: bool,
        fail_load: bool,
    }

    #[derive(Debug)]
    struct FakeSurface {
        recorded: Arc<Mutex<Recorded>>,
        fail_load: bool,
    }

    impl WindowSurface for FakeSurface {
        fn load_url(&self, url: &Url) -> Result<(), String> {
            if self.fail_load {
                return Err("navigation rejected".to_string());
            }
            self.recorded.lock().expect("lock").loaded.push(url.clone());
            Ok(())
        }

        fn discard(&self) {
            self.recorded.lock().expect("lock").discarded += 1;
        }
    }

    impl WindowFactory for FakeFactory {
        type Surface = FakeSurface;

        fn create_window(&self, spec: &WindowSpec) -> Result<FakeSurface, String> {
            if self.fail_create {
                return Err("no display".to_string());
            }
            self.recorded.lock().expect("lock").created.push(spec.clone());
            Ok(FakeSurface {
                recorded: Arc::clone(&self.recorded),
                fail_load: self.fail_load,
            })
        }
    }

    fn development_checkout() -> (tempfile::TempDir, std::path::PathBuf) {
        let checkout = tempfile::tempdir().expect("tempdir");
        let manifest_dir = checkout.path().join("src-tauri");
        let web_root_dir = checkout.path().join("build").join("web");
        fs::create_dir_all(&manifest_dir).expect("manifest dir");
        fs::create_dir_all(&web_root_dir).expect("web root");
        fs::write(web_root_dir.join("index.html"), "<html>ok</html>").expect("index");

        let web_root = resolve_web_root(&PackagingMode::Development { manifest_dir });
        (checkout, web_root)
    }

    #[test]
    fn window_label_numbers_follow_up_windows() {
        assert_eq!(window_label(1), "main");
        assert_eq!(window_label(2), "main-2");
    }

    #[test]
    fn main_spec_uses_fixed_geometry_and_denies_popups() {
        let spec = WindowSpec::main("main");
        assert_eq!((spec.width, spec.height), (1200.0, 800.0));
        assert_eq!(spec.background, (0xff, 0xff, 0xff));
        assert!(spec.deny_new_windows);
    }

    #[tokio::test]
    async fn startup_sequence_loads_entry_document_from_loopback() {
        let (_checkout, web_root) = development_checkout();
        let factory = FakeFactory::default();

        let hosted = open_hosted_window(&factory, &WindowSpec::main("main"), &web_root, None, |_| {})
            .await
            .expect("window should attach");

        assert!(hosted.port >= 1024);
        assert!(hosted.server.is_some());
        assert_eq!(hosted.url.host_str(), Some("127.0.0.1"));
        assert_eq!(hosted.url.port(), Some(hosted.port));

        let loaded = factory.recorded.lock().expect("lock").loaded.clone();
        assert_eq!(loaded, vec![hosted.url.clone()]);

        let body = reqwest::get(hosted.url.as_str())
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn reused_port_skips_server_start() {
        let (_checkout, web_root) = development_checkout();
        let factory = FakeFactory::default();

        let first = open_hosted_window(&factory, &WindowSpec::main("main"), &web_root, None, |_| {})
            .await
            .expect("first window");
        let second = open_hosted_window(
            &factory,
            &WindowSpec::main("main-2"),
            &web_root,
            Some(first.port),
            |_| {},
        )
        .await
        .expect("second window");

        assert!(second.server.is_none());
        assert_eq!(second.port, first.port);
        assert_eq!(factory.recorded.lock().expect("lock").created.len(), 2);
    }

    #[tokio::test]
    async fn create_failure_is_reported_without_starting_server() {
        let (_checkout, web_root) = development_checkout();
        let factory = FakeFactory {
            fail_create: true,
            ..FakeFactory::default()
        };

        let error = open_hosted_window(&factory, &WindowSpec::main("main"), &web_root, None, |_| {})
            .await
            .expect_err("creation should fail");

        assert!(matches!(error, ShellError::WindowCreate { ref label, .. } if label == "main"));
        assert!(factory.recorded.lock().expect("lock").loaded.is_empty());
    }

    #[tokio::test]
    async fn load_failure_discards_window() {
        let (_checkout, web_root) = development_checkout();
        let factory = FakeFactory {
            fail_load: true,
            ..FakeFactory::default()
        };

        let error = open_hosted_window(&factory, &WindowSpec::main("main"), &web_root, None, |_| {})
            .await
            .expect_err("load should fail");

        assert!(matches!(error, ShellError::Load { .. }));
        assert_eq!(factory.recorded.lock().expect("lock").discarded, 1);
    }
}
