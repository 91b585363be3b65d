//! HTTP server adapter.
//!
//! Binds every route in [`control::ROUTES`] on an `EspHttpServer` and
//! forwards requests to [`control::handle`]. The firmware upload route
//! streams its body into [`ota::handle_upload`] instead. All routing and
//! validation lives in the control module; this file only moves bytes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use esp_idf_svc::{
    http::{
        server::{Configuration as HttpConfiguration, EspHttpConnection, EspHttpServer, Request},
        Headers, Method as HttpMethod,
    },
    io::{Read, Write},
};
use log::info;

use crate::adapters::platform;
use crate::control::ota::{self, OtaError, OtaManager, OtaState};
use crate::control::{self, ControlResponse, ControlTarget, Method};

/// Largest accepted request body. The timer form is a few dozen bytes.
pub const MAX_BODY: usize = 512;

const HTTP_STACK_SIZE: usize = 8 * 1024;

/// Time for the upload reply to reach the browser before the restart.
const REBOOT_DELAY: Duration = Duration::from_millis(1500);

/// Start the server and register the control routes.
///
/// The returned server must be kept alive; dropping it stops serving.
pub fn start<T>(target: Arc<T>, port: u16) -> anyhow::Result<EspHttpServer<'static>>
where
    T: ControlTarget + Send + Sync + 'static,
{
    let conf = HttpConfiguration {
        http_port: port,
        stack_size: HTTP_STACK_SIZE,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;

    for &(method, path) in control::ROUTES {
        let target = Arc::clone(&target);
        let http_method = match method {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
        };
        server.fn_handler::<anyhow::Error, _>(path, http_method, move |mut req| {
            let body = read_body(&mut req)?;
            let response = control::handle(&*target, method, path, &body);
            write_response(req, &response)
        })?;
    }

    // One upload at a time. Stays set once an image is accepted, until
    // the restart.
    let upload_busy = AtomicBool::new(false);
    server.fn_handler::<anyhow::Error, _>(ota::OTA_ROUTE, HttpMethod::Post, move |mut req| {
        if upload_busy.swap(true, Ordering::AcqRel) {
            let busy = ControlResponse::from_error(&OtaError::AlreadyInProgress.into());
            return write_response(req, &busy);
        }

        // The esp-ota handle is not `Send`, so it lives for this request only.
        let mut manager = OtaManager::new();
        let content_len = req.content_len().and_then(|n| usize::try_from(n).ok());
        let response = ota::handle_upload(&mut manager, content_len, |buf| req.read(buf));
        let reboot = manager.state() == OtaState::ReadyToReboot;
        if !reboot {
            upload_busy.store(false, Ordering::Release);
        }

        let written = write_response(req, &response);
        if reboot {
            platform::restart_after(REBOOT_DELAY);
        }
        written
    })?;

    info!(
        "HTTP: serving {} routes + {} on port {}",
        control::ROUTES.len(),
        ota::OTA_ROUTE,
        port
    );
    Ok(server)
}

fn read_body(req: &mut Request<&mut EspHttpConnection<'_>>) -> anyhow::Result<Vec<u8>> {
    let len = req.content_len().unwrap_or(0) as usize;
    if len > MAX_BODY {
        return Err(anyhow!("request body too large ({len} bytes)"));
    }

    let mut body = vec![0_u8; len];
    let mut filled = 0;
    while filled < len {
        match req.read(&mut body[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    body.truncate(filled);
    Ok(body)
}

fn write_response(
    req: Request<&mut EspHttpConnection<'_>>,
    response: &ControlResponse,
) -> anyhow::Result<()> {
    let status = response.status();
    match response {
        ControlResponse::Redirect(location) => {
            req.into_response(status, None, &[("Location", *location)])?;
        }
        _ => {
            let content_type;
            let headers: &[(&str, &str)] = if let Some(ct) = response.content_type() {
                content_type = [("Content-Type", ct)];
                &content_type
            } else {
                &[]
            };
            req.into_response(status, None, headers)?
                .write_all(response.body())?;
        }
    }
    Ok(())
}
