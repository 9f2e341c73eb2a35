const DESKTOP_BRIDGE_COMMANDS: &[&str] = &[
    "desktop_bridge_console_message",
    "desktop_bridge_is_desktop_runtime",
];

fn main() {
    tauri_build::try_build(
        tauri_build::Attributes::new()
            .app_manifest(tauri_build::AppManifest::new().commands(DESKTOP_BRIDGE_COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
