//! HTTP status / operator surface.
//!
//! | Route          | Effect                                        |
//! |----------------|-----------------------------------------------|
//! | `/`            | HTML status page                              |
//! | `/LED=ON`      | queue [`AppCommand::ResetEnable`], redirect   |
//! | `/LED=OFF`     | queue [`AppCommand::Disable`], redirect       |
//! | `/status.json` | latest [`StatusReport`] as JSON               |
//!
//! Routing and rendering are pure and host-tested.  The ESP-IDF server
//! runs handlers on its own task; they only talk to the control loop
//! through [`crate::adapters::channels`].

use core::fmt::Write as _;

use crate::app::commands::AppCommand;
use crate::app::events::StatusReport;

pub const ROUTE_INDEX: &str = "/";
pub const ROUTE_RESET_ENABLE: &str = "/LED=ON";
pub const ROUTE_DISABLE: &str = "/LED=OFF";
pub const ROUTE_STATUS_JSON: &str = "/status.json";

/// Map a request URI to the operator command it triggers.
/// Any query string is ignored.
pub fn route_command(path: &str) -> Option<AppCommand> {
    let path = path.split('?').next().unwrap_or(path);
    match path {
        ROUTE_RESET_ENABLE => Some(AppCommand::ResetEnable),
        ROUTE_DISABLE => Some(AppCommand::Disable),
        _ => None,
    }
}

/// Render the status page.  `None` before the first control tick.
pub fn render_page(report: Option<&StatusReport>) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(
        "<!DOCTYPE html><html><head><meta name=\"viewport\" \
         content=\"width=device-width, initial-scale=1\">\
         <title>flowguard</title></head><body><h1>flowguard pump interlock</h1>",
    );

    match report {
        None => html.push_str("<p>Waiting for first sample&hellip;</p>"),
        Some(r) => {
            let _ = write!(
                html,
                "<p>Pump: <b>{}</b> (mode {})</p>\
                 <p>Upstream command: {} (level {})</p>\
                 <p>Flow: {:.1} L/h, average {}</p>\
                 <p>Retries: {}/{}</p>\
                 <p>Battery {} / Solar {}{}</p>\
                 <p>Status LED: {}</p>",
                if r.force_off { "FORCED OFF" } else { "allowed" },
                r.mode,
                if r.pump_commanded_on { "on" } else { "off" },
                r.pump_level_raw,
                r.flow_l_per_hour,
                match r.mean_flow {
                    Some(m) => format!("{m:.1} L/h"),
                    None => "n/a".to_string(),
                },
                r.retry_attempts,
                r.max_retry_attempts,
                r.battery_raw,
                r.solar_raw,
                if r.adc_ok { "" } else { " (stale: ADC error)" },
                if r.status_led_on { "ON" } else { "OFF" },
            );
            let _ = write!(html, "<pre>{r}</pre>");
        }
    }

    let _ = write!(
        html,
        "<p><a href=\"{ROUTE_RESET_ENABLE}\"><button>RESET / LED ON</button></a> \
         <a href=\"{ROUTE_DISABLE}\"><button>LED OFF</button></a></p>\
         <p><a href=\"{ROUTE_STATUS_JSON}\">status.json</a></p></body></html>"
    );
    html
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF server
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::Write;
    use log::info;

    use super::*;
    use crate::adapters::channels::{latest_status, submit_command};

    /// Start the server on port 80 and register every route.
    ///
    /// The returned server must be kept alive for as long as it should
    /// serve.
    pub fn start_server() -> anyhow::Result<EspHttpServer<'static>> {
        let mut server = EspHttpServer::new(&Configuration::default())?;

        server.fn_handler::<anyhow::Error, _>(ROUTE_INDEX, Method::Get, |req| {
            let page = render_page(latest_status().as_ref());
            req.into_ok_response()?.write_all(page.as_bytes())?;
            Ok(())
        })?;

        for route in [ROUTE_RESET_ENABLE, ROUTE_DISABLE] {
            server.fn_handler::<anyhow::Error, _>(route, Method::Get, |req| {
                if let Some(cmd) = route_command(req.uri()) {
                    info!("HTTP: {} -> {cmd:?}", req.uri());
                    submit_command(cmd);
                }
                req.into_response(303, Some("See Other"), &[("Location", ROUTE_INDEX)])?;
                Ok(())
            })?;
        }

        server.fn_handler::<anyhow::Error, _>(ROUTE_STATUS_JSON, Method::Get, |req| {
            let body = match latest_status() {
                Some(report) => serde_json::to_string(&report)?,
                None => "null".to_string(),
            };
            req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
                .write_all(body.as_bytes())?;
            Ok(())
        })?;

        info!("HTTP: server listening on :80");
        Ok(server)
    }
}

#[cfg(target_os = "espidf")]
pub use esp::start_server;
