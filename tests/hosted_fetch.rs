use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use penguinview::{CsvLoader, DataLoader, DatasetError, DatasetLocation, DatasetLocator, ExecutionMode};

/// Serves one request with `status` and `body`, returning the notebook root URL.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let root = format!("http://{}/demo", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }

        // The client may hang up once it has read the status line.
        let _ = write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.flush();
        request_line
    });

    (root, handle)
}

fn hosted(root: String) -> DatasetLocation {
    DatasetLocator::new(ExecutionMode::Hosted { notebook_root: root })
        .resolve()
        .unwrap()
}

#[test]
fn hosted_fetch_reads_published_csv() {
    let (root, server) = serve_once(
        "200 OK",
        "species,bill_length_mm,bill_depth_mm\n\
         Adelie,39.1,18.7\n\
         Gentoo,46.1,13.2\n\
         Chinstrap,46.5,17.9\n",
    );

    let data = CsvLoader.load(&hosted(root)).unwrap();
    assert_eq!(data.row_count(), 3);
    assert_eq!(data.headers[0], "species");

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /demo/public/penguins.csv "), "{request_line}");
}

#[test]
fn hosted_fetch_error_status_is_not_found() {
    let (root, server) = serve_once("404 Not Found", "missing");

    let location = hosted(root);
    let err = CsvLoader.load(&location).unwrap_err();
    match err {
        DatasetError::NotFound { location: reported } => assert_eq!(reported, location.to_string()),
        other => panic!("expected NotFound, got {other:?}"),
    }
    server.join().unwrap();
}

#[test]
fn hosted_fetch_connection_refused_is_not_found() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let location = hosted(format!("http://127.0.0.1:{port}"));
    let err = CsvLoader.load(&location).unwrap_err();
    assert!(matches!(err, DatasetError::NotFound { .. }), "{err:?}");
}
