use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// A one-request-per-connection HTTP server that replays canned responses
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve `responses` (status, JSON body) in order, one per connection
    pub fn spawn(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let request_line = read_request(&mut stream);
                log.lock().unwrap().push(request_line);

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self {
            url: format!("http://{}/maps/api/geocode/json", addr),
            requests,
        }
    }

    /// Request lines received so far, e.g. "GET /maps/api/geocode/json?latlng=... HTTP/1.1"
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    let _ = reader.read_line(&mut request_line);

    // Drain headers; GET requests carry no body
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line == "\r\n" => break,
            Ok(_) => {}
        }
    }

    request_line.trim_end().to_string()
}

/// An address nobody is listening on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/maps/api/geocode/json", addr)
}

pub fn ok_body(state: &str, lga: &str) -> String {
    format!(
        r#"{{"status":"OK","results":[{{"address_components":[
            {{"long_name":"{lga}","short_name":"{lga}","types":["administrative_area_level_2","political"]}},
            {{"long_name":"{state}","short_name":"{state}","types":["administrative_area_level_1","political"]}},
            {{"long_name":"Country","short_name":"CC","types":["country","political"]}}
        ]}}]}}"#
    )
}

pub fn status_body(status: &str) -> String {
    format!(r#"{{"status":"{status}","results":[]}}"#)
}
