//! Showing figures
//!
//! In browser mode each figure gets a throwaway HTTP server on localhost: the
//! page is handed to the first request for it and the server is dropped.
//! Directory mode writes the pages to disk instead.

use crate::chart::Figure;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tiny_http::{Header, Response, Server};

/// Where figures go
#[derive(Debug, Clone)]
pub enum Display {
    /// Open each figure in the default browser
    Browser,
    /// Write `<name>.html` files into a directory
    Directory(PathBuf),
}

impl Display {
    /// Show a figure, blocking until it has been delivered
    pub fn show(&self, figure: &Figure, name: &str) -> Result<()> {
        let html = figure.to_html()?;
        match self {
            Display::Browser => {
                let server = PageServer::bind()?;
                server.open_browser();
                server.serve_once(&html)
            }
            Display::Directory(dir) => {
                let path = write_page(dir, name, &html)?;
                log::info!("{} written to {}", figure.title, path.display());
                Ok(())
            }
        }
    }
}

fn write_page(dir: &Path, name: &str, html: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(format!("{}.html", name));
    std::fs::write(&path, html)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Single-page server on an OS-assigned localhost port
pub struct PageServer {
    server: Server,
    url: String,
}

impl PageServer {
    pub fn bind() -> Result<Self> {
        let server = Server::http("127.0.0.1:0")
            .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .context("Server is not listening on a TCP address")?;
        let url = format!("http://127.0.0.1:{}/", port);
        Ok(Self { server, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn open_browser(&self) {
        log::info!("Opening {}", self.url());
        if let Err(e) = webbrowser::open(self.url()) {
            log::warn!("Could not open browser: {}. Please open {} manually.", e, self.url);
        }
    }

    /// Answer requests until the page itself has been delivered
    pub fn serve_once(self, html: &str) -> Result<()> {
        for request in self.server.incoming_requests() {
            let path = request.url().to_string();
            log::debug!("GET {}", path);

            match path.as_str() {
                "/" | "/index.html" => {
                    let content_type = Header::from_bytes("Content-Type", "text/html; charset=utf-8")
                        .map_err(|_| anyhow::anyhow!("Invalid Content-Type header"))?;
                    request
                        .respond(Response::from_string(html).with_header(content_type))
                        .context("Failed to send page to browser")?;
                    return Ok(());
                }
                _ => {
                    let _ = request.respond(Response::from_string("Not found").with_status_code(404));
                }
            }
        }

        anyhow::bail!("Server stopped before the page was requested")
    }
}
