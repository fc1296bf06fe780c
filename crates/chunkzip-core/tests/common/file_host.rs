//! Minimal HTTP/1.1 file host that serves directory listings for integration tests.
//!
//! Serves one package at `/plugins/{slug}/trunk/...` whatever the slug.
//! Directory URLs get `<li><a href="...">...</a></li>` listings with a parent
//! link; file URLs get the raw body. Paths marked broken are listed but
//! answer 404 on GET.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

pub struct FileHost {
    /// Source URL template for `WorkerConfig::source_url`.
    pub template: String,
    listings: Arc<AtomicUsize>,
}

impl FileHost {
    /// Number of directory listings served so far.
    pub fn listing_requests(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

struct Tree {
    files: Vec<(String, Vec<u8>)>,
    broken: HashSet<String>,
}

/// Starts a host for `files` (`("/sub/a.php", body)`), listed in the given order.
pub fn start(files: Vec<(&str, Vec<u8>)>) -> FileHost {
    start_with_broken(files, &[])
}

/// Like `start`, but GETs for paths in `broken` return 404.
pub fn start_with_broken(files: Vec<(&str, Vec<u8>)>, broken: &[&str]) -> FileHost {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let tree = Arc::new(Tree {
        files: files
            .into_iter()
            .map(|(p, b)| (p.to_string(), b))
            .collect(),
        broken: broken.iter().map(|s| s.to_string()).collect(),
    });
    let listings = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&listings);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let tree = Arc::clone(&tree);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &tree, &counter));
        }
    });
    FileHost {
        template: format!("http://127.0.0.1:{}/plugins/{{slug}}/trunk", port),
        listings,
    }
}

fn handle(mut stream: std::net::TcpStream, tree: &Tree, listings: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    let Some(rest) = package_relative(target) else {
        respond(&mut stream, "404 Not Found", "text/plain", b"not found");
        return;
    };

    let rel = rest.trim_end_matches('/');
    if rest.ends_with('/') || rel.is_empty() {
        match listing(tree, rel) {
            Some(html) => {
                listings.fetch_add(1, Ordering::SeqCst);
                respond(&mut stream, "200 OK", "text/html", html.as_bytes());
            }
            None => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
        }
        return;
    }

    if tree.broken.contains(rel) {
        respond(&mut stream, "404 Not Found", "text/plain", b"not found");
        return;
    }
    match tree.files.iter().find(|(p, _)| p == rel) {
        Some((_, body)) => respond(&mut stream, "200 OK", "application/octet-stream", body),
        None => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
    }
}

/// `/plugins/{slug}/trunk/sub/` -> `/sub/`
fn package_relative(target: &str) -> Option<&str> {
    let after = target.strip_prefix("/plugins/")?;
    let (_, rest) = after.split_once('/')?;
    rest.strip_prefix("trunk")
}

/// Listing of immediate children of `dir` (`""` for root), or None if `dir`
/// has no files below it (root always lists).
fn listing(tree: &Tree, dir: &str) -> Option<String> {
    let prefix = format!("{}/", dir);
    let mut children: Vec<(String, bool)> = Vec::new();
    for (path, _) in &tree.files {
        let Some(rest) = path.strip_prefix(&prefix) else {
            continue;
        };
        let (name, is_dir) = match rest.split_once('/') {
            Some((first, _)) => (first.to_string(), true),
            None => (rest.to_string(), false),
        };
        if !children.iter().any(|(n, _)| *n == name) {
            children.push((name, is_dir));
        }
    }
    if children.is_empty() && !dir.is_empty() {
        return None;
    }
    let mut html = String::from("<html><body><ul>\n<li><a href=\"../\">..</a></li>\n");
    for (name, is_dir) in children {
        if is_dir {
            html.push_str(&format!("<li><a href=\"{0}/\">{0}/</a></li>\n", name));
        } else {
            html.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", name));
        }
    }
    html.push_str("</ul></body></html>\n");
    Some(html)
}

fn respond(stream: &mut std::net::TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
