use hearth::http::parser::{Needed, ParseError, RequestParser, parse_http_request};
use hearth::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::GET);
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_post_request_with_body() {
    let req = b"POST /files/test.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/files/test.txt");
    assert_eq!(parsed.body, b"hello".to_vec());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(parsed.header("User-Agent"), Some("test-client"));
    assert_eq!(parsed.header("Accept"), Some("*/*"));
    assert_eq!(parsed.headers.len(), 3);
}

#[test]
fn test_parse_request_target_is_not_decoded() {
    let req = b"GET /echo/a%20b?q=rust HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.path, "/echo/a%20b?q=rust");
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req);

    assert!(matches!(
        result,
        Err(ParseError::Incomplete(Needed::Head { .. }))
    ));
}

#[test]
fn test_parse_incomplete_request_partial_body() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello";
    let result = parse_http_request(req);

    assert_eq!(
        result.unwrap_err(),
        ParseError::Incomplete(Needed::Body {
            declared: 10,
            received: 5
        })
    );
}

#[test]
fn test_parse_empty_buffer_is_incomplete() {
    assert_eq!(
        parse_http_request(b"").unwrap_err(),
        ParseError::Incomplete(Needed::Head { received: 0 })
    );
}

#[test]
fn test_parse_request_line_with_too_few_fields() {
    let result = parse_http_request(b"GET /\r\n\r\n");

    assert_eq!(
        result.unwrap_err(),
        ParseError::MalformedRequestLine("GET /".to_string())
    );
}

#[test]
fn test_parse_malformed_request_line_detected_before_headers_end() {
    let result = parse_http_request(b"garbage\r\nHost: x\r\n");

    assert!(matches!(result, Err(ParseError::MalformedRequestLine(_))));
}

#[test]
fn test_parse_unknown_method_is_accepted() {
    let req = b"BREW /pot HTTP/1.1\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::Extension("BREW".to_string()));
}

#[test]
fn test_parse_header_without_colon_is_skipped() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_header_value_is_trimmed_and_split_at_first_colon() {
    let req = b"GET / HTTP/1.1\r\nHost:   localhost:4221   \r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("host"), Some("localhost:4221"));
}

#[test]
fn test_parse_repeated_header_last_write_wins() {
    let req = b"GET / HTTP/1.1\r\nX-Test: one\r\nx-test: two\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("X-Test"), Some("two"));
}

#[test]
fn test_parse_various_http_methods() {
    let methods = vec![
        ("GET", Method::GET),
        ("POST", Method::POST),
        ("PUT", Method::PUT),
        ("DELETE", Method::DELETE),
        ("HEAD", Method::HEAD),
        ("OPTIONS", Method::OPTIONS),
        ("PATCH", Method::PATCH),
    ];

    for (method_str, expected_method) in methods {
        let req = format!("{} / HTTP/1.1\r\n\r\n", method_str);
        let (parsed, _) = parse_http_request(req.as_bytes()).unwrap();
        assert_eq!(parsed.method, expected_method);
    }
}

#[test]
fn test_parse_request_with_zero_content_length() {
    let req = b"POST /api HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert!(parsed.body.is_empty());
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_invalid_or_negative_content_length_means_no_body() {
    for value in ["abc", "-5", ""] {
        let req = format!("POST /api HTTP/1.1\r\nContent-Length: {}\r\n\r\nleftover", value);
        let (parsed, consumed) = parse_http_request(req.as_bytes()).unwrap();

        assert!(parsed.body.is_empty(), "value {:?}", value);
        assert_eq!(consumed, req.len() - "leftover".len());
    }
}

#[test]
fn test_parse_content_length_header_is_case_insensitive() {
    let req = b"POST /api HTTP/1.1\r\ncontent-length: 3\r\n\r\nabc";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, b"abc".to_vec());
}

#[test]
fn test_parse_request_with_binary_body() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.body, vec![0, 1, b'\r', b'\n']);
}

#[test]
fn test_parse_leaves_next_request_in_buffer() {
    let req = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
    let (first, consumed) = parse_http_request(req).unwrap();
    let (second, rest) = parse_http_request(&req[consumed..]).unwrap();

    assert_eq!(first.path, "/a");
    assert_eq!(second.path, "/b");
    assert_eq!(consumed + rest, req.len());
}

#[test]
fn test_parse_header_case_preservation() {
    let req = b"GET / HTTP/1.1\r\nContent-Type: application/json\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    let names: Vec<&str> = parsed.headers.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["Content-Type"]);
}

#[test]
fn test_needed_maps_to_end_of_stream_errors() {
    assert_eq!(
        Needed::Head { received: 7 }.at_end_of_stream(),
        ParseError::HeaderRead { received: 7 }
    );
    assert_eq!(
        Needed::Body {
            declared: 10,
            received: 2
        }
        .at_end_of_stream(),
        ParseError::BodyRead {
            declared: 10,
            received: 2
        }
    );
}

#[test]
fn test_parse_header_name_is_stored_as_sent() {
    let req = b"GET / HTTP/1.1\r\nX-Spaced : value\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    let pairs: Vec<(&str, &str)> = parsed.headers.iter().collect();
    assert_eq!(pairs, vec![("X-Spaced ", "value")]);
    assert_eq!(parsed.header("X-Spaced"), None);
}

#[test]
fn test_request_parser_accepts_one_byte_at_a_time() {
    let req = b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET / HTTP/1.1\r\n\r\n";
    let first_len = req.len() - b"GET / HTTP/1.1\r\n\r\n".len();

    let mut parser = RequestParser::new();
    let mut buf = Vec::new();

    for (i, byte) in req[..first_len].iter().enumerate() {
        buf.push(*byte);
        let result = parser.parse(&buf);

        if i + 1 < first_len {
            assert!(matches!(result, Err(ParseError::Incomplete(_))), "byte {}", i);
        } else {
            let (parsed, consumed) = result.unwrap();
            assert_eq!(parsed.path, "/files/a");
            assert_eq!(parsed.body, b"abc".to_vec());
            assert_eq!(consumed, first_len);
        }
    }

    // The parser starts over on the next request
    let (next, _) = parser.parse(&req[first_len..]).unwrap();
    assert_eq!(next.path, "/");
}

#[test]
fn test_request_parser_does_not_reparse_head_while_body_arrives() {
    let head = b"POST /files/big HTTP/1.1\r\nContent-Length: 6\r\n\r\n";
    let mut buf = head.to_vec();
    buf.extend_from_slice(b"abc");

    let mut parser = RequestParser::new();
    assert_eq!(
        parser.parse(&buf).unwrap_err(),
        ParseError::Incomplete(Needed::Body {
            declared: 6,
            received: 3
        })
    );

    // Had the head been read again, this request line would be malformed
    let line_len = b"POST /files/big HTTP/1.1".len();
    buf[..line_len].fill(b'x');
    buf.extend_from_slice(b"def");

    let (parsed, consumed) = parser.parse(&buf).unwrap();
    assert_eq!(parsed.method, Method::POST);
    assert_eq!(parsed.path, "/files/big");
    assert_eq!(parsed.body, b"abcdef".to_vec());
    assert_eq!(consumed, buf.len());
}

#[test]
fn test_parse_many_distinct_headers() {
    let mut req = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..5000 {
        req.extend_from_slice(format!("h{:x}: {}\r\n", i, i).as_bytes());
    }
    req.extend_from_slice(b"\r\n");

    let (parsed, consumed) = parse_http_request(&req).unwrap();

    assert_eq!(parsed.headers.len(), 5000);
    assert_eq!(parsed.header("H1F3"), Some("499"));
    assert_eq!(consumed, req.len());
}
