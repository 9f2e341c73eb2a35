use serde::Deserialize;
use url::Url;

use crate::{static_server, CONSOLE_BRIDGE_COMMAND};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Debug,
    #[serde(alias = "log")]
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One console call forwarded from the loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

pub fn format_console_line(message: &ConsoleMessage) -> String {
    format!(
        "console.{}: {} ({}:{})",
        message.level.as_str(),
        message.message,
        message.source.as_deref().unwrap_or("unknown"),
        message
            .line
            .map(|line| line.to_string())
            .unwrap_or_else(|| "?".to_string())
    )
}

/// Initialization script that mirrors `console.*` calls to the host log.
///
/// The page keeps its normal console behaviour; forwarding failures are
/// swallowed so a missing IPC grant never breaks the page.
pub fn console_bridge_script() -> String {
    let command = serde_json::to_string(CONSOLE_BRIDGE_COMMAND)
        .unwrap_or_else(|_| "\"desktop_bridge_console_message\"".to_string());
    format!(
        r#"(function () {{
  if (window.__APP_WS_CONSOLE_BRIDGE__) return;
  window.__APP_WS_CONSOLE_BRIDGE__ = true;
  var levels = {{ debug: "debug", log: "info", info: "info", warn: "warn", error: "error" }};
  var stringify = function (value) {{
    if (typeof value === "string") return value;
    try {{ return JSON.stringify(value); }} catch (_) {{ return String(value); }}
  }};
  var callerSource = function () {{
    var stack = (new Error().stack || "").split("\n");
    var frame = stack.length > 3 ? stack[3] : "";
    var match = frame.match(/(https?:\/\/[^\s)]+):(\d+):\d+/);
    return match ? {{ source: match[1], line: Number(match[2]) }} : {{ source: null, line: null }};
  }};
  Object.keys(levels).forEach(function (name) {{
    var original = console[name];
    console[name] = function () {{
      var args = Array.prototype.slice.call(arguments);
      try {{
        var internals = window.__TAURI_INTERNALS__;
        if (internals && typeof internals.invoke === "function") {{
          var origin = callerSource();
          internals.invoke({command}, {{
            message: {{
              level: levels[name],
              message: args.map(stringify).join(" "),
              source: origin.source,
              line: origin.line
            }}
          }}).catch(function () {{}});
        }}
      }} catch (_) {{}}
      return original.apply(console, args);
    }};
  }});
}})();"#
    )
}

/// Whether a finished page load landed on the local server that was assigned
/// to the window. Anything else (an error page, `about:blank`) means the
/// main frame failed to load.
pub fn is_local_origin(url: &Url, port: Option<u16>) -> bool {
    let expected_host = std::net::Ipv4Addr::LOCALHOST.to_string();
    url.scheme() == "http"
        && url.host_str() == Some(expected_host.as_str())
        && match port {
            Some(port) => url.port() == Some(port),
            None => url.port().is_some(),
        }
}

pub fn expected_origin(port: u16) -> String {
    static_server::local_origin_url(port)
}
