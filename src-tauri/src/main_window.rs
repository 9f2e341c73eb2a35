use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU16, Ordering},
        Arc,
    },
};

use tauri::{
    webview::{NewWindowResponse, PageLoadEvent},
    window::Color,
    AppHandle, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
};
use url::Url;

use crate::{
    append_window_log, desktop_bridge,
    shell_config::ShellConfig,
    webui_paths,
    window_host::{WindowFactory, WindowSpec, WindowSurface},
    SOFTWARE_RENDERING_BROWSER_ARGS, WEB_ROOT_ENTRY_FILE,
};

pub fn window_spec(label: String, packaged: bool, config: &ShellConfig) -> WindowSpec {
    let mut spec = WindowSpec::main(label);
    spec.open_devtools = config.devtools_enabled(packaged);
    if config.software_rendering {
        spec.browser_args = Some(SOFTWARE_RENDERING_BROWSER_ARGS.to_string());
    }
    spec
}

/// Builds real webview windows for [`crate::window_host::open_hosted_window`].
pub struct TauriWindowFactory {
    app_handle: AppHandle,
    web_root: PathBuf,
}

impl TauriWindowFactory {
    pub fn new(app_handle: AppHandle, web_root: PathBuf) -> Self {
        Self {
            app_handle,
            web_root,
        }
    }
}

/// A webview window plus the port it is expected to stay on.
pub struct TauriSurface {
    window: WebviewWindow,
    expected_port: Arc<AtomicU16>,
}

impl WindowSurface for TauriSurface {
    fn load_url(&self, url: &Url) -> Result<(), String> {
        self.expected_port
            .store(url.port().unwrap_or_default(), Ordering::Relaxed);
        self.window
            .navigate(url.clone())
            .map_err(|error| format!("navigation to {url} failed: {error}"))
    }

    fn discard(&self) {
        if let Err(error) = self.window.destroy() {
            append_window_log(&format!(
                "failed to destroy window {}: {}",
                self.window.label(),
                error
            ));
        }
    }
}

/// Page-load diagnostic line. Port 0 means the window has not been pointed
/// at its server yet.
fn page_load_message(
    label: &str,
    event: PageLoadEvent,
    url: &Url,
    expected_port: u16,
    web_root: &Path,
) -> String {
    match event {
        PageLoadEvent::Started => format!("window {label} page-load started: {url}"),
        PageLoadEvent::Finished if expected_port == 0 => {
            format!("window {label} page-load finished: {url}")
        }
        PageLoadEvent::Finished => {
            if !desktop_bridge::is_local_origin(url, Some(expected_port)) {
                format!(
                    "window {label} main frame failed to load: landed on {url}, expected {}",
                    desktop_bridge::expected_origin(expected_port)
                )
            } else if webui_paths::web_root_entry_missing(web_root) {
                format!(
                    "window {label} main frame failed to load: {url} has no {} under {}",
                    WEB_ROOT_ENTRY_FILE,
                    web_root.display()
                )
            } else {
                format!("window {label} page-load finished: {url}")
            }
        }
    }
}

impl WindowFactory for TauriWindowFactory {
    type Surface = TauriSurface;

    fn create_window(&self, spec: &WindowSpec) -> Result<TauriSurface, String> {
        let blank = Url::parse("about:blank").map_err(|error| error.to_string())?;
        let expected_port = Arc::new(AtomicU16::new(0));
        let (red, green, blue) = spec.background;

        let page_load_port = Arc::clone(&expected_port);
        let page_load_root = self.web_root.clone();
        let mut builder =
            WebviewWindowBuilder::new(&self.app_handle, spec.label.as_str(), WebviewUrl::External(blank))
                .title(spec.title.as_str())
                .inner_size(spec.width, spec.height)
                .background_color(Color(red, green, blue, 255))
                .initialization_script(&desktop_bridge::console_bridge_script())
                .on_page_load(move |window, payload| {
                    append_window_log(&page_load_message(
                        window.label(),
                        payload.event(),
                        payload.url(),
                        page_load_port.load(Ordering::Relaxed),
                        &page_load_root,
                    ));
                });

        if spec.deny_new_windows {
            let label = spec.label.clone();
            builder = builder.on_new_window(move |url, _features| {
                append_window_log(&format!("window {label} blocked new window request: {url}"));
                NewWindowResponse::Deny
            });
        }

        #[cfg(target_os = "windows")]
        if let Some(args) = spec.browser_args.as_deref() {
            builder = builder.additional_browser_args(args);
        }

        let window = builder
            .build()
            .map_err(|error| format!("failed to build webview window: {error}"))?;

        #[cfg(any(debug_assertions, feature = "devtools"))]
        if spec.open_devtools {
            window.open_devtools();
        }

        Ok(TauriSurface {
            window,
            expected_port,
        })
    }
}
