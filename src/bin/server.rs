#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Serves the browser build of the game.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
struct Opts {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,
    /// Directory holding index.html, main.js and the wasm-pack output
    #[arg(long, default_value = "web")]
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let root = opts.root.canonicalize().map_err(|e| {
        anyhow::anyhow!("web directory not found at {}: {e}", opts.root.display())
    })?;
    let defaults = serde_json::to_string_pretty(&tetri::GameSettings::default())?;

    let server = Server::http(&opts.addr).map_err(|e| anyhow::anyhow!("bind {}: {e}", opts.addr))?;
    println!("Serving {} on http://{}", root.display(), opts.addr);
    for request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let status = respond(request, &root, &defaults);
        println!("{} {} -> {}", method, url, status.0);
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn respond(request: Request, root: &Path, defaults: &str) -> StatusCode {
    let path = request.url().split('?').next().unwrap_or("/").to_string();
    if path == "/settings.json" {
        let resp = with_content_type(
            Response::from_string(defaults),
            "application/json",
        );
        return send(request, resp, StatusCode(200));
    }
    let Some(file_path) = sanitize_path(root, &path) else {
        return send(request, not_found_response(), StatusCode(404));
    };
    match fs::File::open(&file_path) {
        Ok(file) => {
            let resp = with_content_type(Response::from_file(file), content_type_for(&file_path));
            send(request, resp, StatusCode(200))
        }
        Err(e) => {
            eprintln!("open {}: {e}", file_path.display());
            send(request, not_found_response(), StatusCode(404))
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn send<R: std::io::Read>(request: Request, resp: Response<R>, status: StatusCode) -> StatusCode {
    if let Err(e) = request.respond(resp.with_status_code(status)) {
        eprintln!("respond failed: {e}");
    }
    status
}

#[cfg(not(target_arch = "wasm32"))]
fn with_content_type<R: std::io::Read>(mut resp: Response<R>, mime: &str) -> Response<R> {
    if let Ok(h) = Header::from_bytes("Content-Type", mime.as_bytes()) {
        resp.add_header(h);
    }
    resp
}

#[cfg(not(target_arch = "wasm32"))]
fn sanitize_path(root: &Path, url: &str) -> Option<PathBuf> {
    let rel = url.trim_start_matches('/');
    let full = root.join(if rel.is_empty() { "index.html" } else { rel });
    let path = if full.is_dir() { full.join("index.html") } else { full };
    // Resolve `..` before the containment check.
    let path = path.canonicalize().ok()?;
    path.starts_with(root).then_some(path)
}

#[cfg(not(target_arch = "wasm32"))]
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "js" => "application/javascript",
        "css" => "text/css",
        "wasm" => "application/wasm",
        "json" => "application/json",
        "ts" => "application/typescript",
        _ => "application/octet-stream",
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn not_found_response() -> Response<Cursor<Vec<u8>>> {
    Response::from_string("Not Found")
}
