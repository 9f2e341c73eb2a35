#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    app_ws_desktop_lib::run();
}
