#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// Accepts exactly one connection on a loopback port, reads the request
/// (head plus a `content-length` body), answers `response` and returns the
/// request text. The listener is gone once the thread ends.
pub(crate) fn serve_once(response: &'static str) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut body_len = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    body_len = value.trim().parse().unwrap();
                }
            }
            request.push_str(&line);
        }
        let mut body = vec![0; body_len];
        reader.read_exact(&mut body).unwrap();
        request.push_str("\r\n");
        request.push_str(&String::from_utf8_lossy(&body));

        stream.write_all(response.as_bytes()).unwrap();
        request
    });

    (port, handle)
}

/// Accepts connections on a loopback port and never answers.
pub(crate) fn black_hole() -> (u16, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, listener)
}
