//! Backend HTTP client.
//!
//! Talks JSON to the CodeBuddy API server. All calls are blocking and
//! must run in a background thread. Uses `ureq` with a timeout on
//! every request.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::types::Action;

/// Send one assist request and return the reply text.
/// This blocks; callers run it in a background thread.
pub fn request_assist(
    base_url: &str,
    timeout_secs: u64,
    action: Action,
    language: &str,
    code: &str,
    error_message: &str,
    problem_description: &str,
) -> Result<String> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build();

    let url = format!("{}{}", base_url.trim_end_matches('/'), action.path());
    let body = request_body(action, language, code, error_message, problem_description);

    let resp = agent
        .post(&url)
        .set("content-type", "application/json")
        .send_string(&serde_json::to_string(&body)?);

    match resp {
        Ok(resp) => {
            let json: serde_json::Value = serde_json::from_reader(resp.into_reader())
                .context("Failed to parse backend response")?;
            Ok(extract_reply(&json))
        }
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            anyhow::bail!("{}", status_message(code, &body))
        }
        Err(ureq::Error::Transport(e)) => {
            anyhow::bail!("Network error: {}", e)
        }
    }
}

/// Hit the backend's hello endpoint to verify the connection.
/// This blocks; callers run it in a background thread.
pub fn ping(base_url: &str, timeout_secs: u64) -> Result<String> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build();

    let url = format!("{}/api/message", base_url.trim_end_matches('/'));

    match agent.get(&url).call() {
        Ok(resp) => {
            let json: serde_json::Value = serde_json::from_reader(resp.into_reader())
                .context("Failed to parse backend response")?;
            json["api_message"]
                .as_str()
                .map(|s| s.to_string())
                .context("Unexpected backend response format")
        }
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            anyhow::bail!("{}", status_message(code, &body))
        }
        Err(ureq::Error::Transport(e)) => {
            anyhow::bail!("Network error: {}", e)
        }
    }
}

/// Build the JSON body for an action. Only the analyze action carries
/// the error message; suggestions always carry a problem description,
/// even when it is empty.
fn request_body(
    action: Action,
    language: &str,
    code: &str,
    error_message: &str,
    problem_description: &str,
) -> serde_json::Value {
    match action {
        Action::Explain => serde_json::json!({
            "code": code,
            "language": language,
        }),
        Action::AnalyzeError => serde_json::json!({
            "code": code,
            "language": language,
            "error_message": error_message,
        }),
        Action::Suggestions => serde_json::json!({
            "code": code,
            "language": language,
            "problem_description": problem_description,
        }),
    }
}

/// Pull the reply text out of a success payload: `explanation`, then
/// `api_message`, then the whole payload pretty-printed.
fn extract_reply(json: &serde_json::Value) -> String {
    if let Some(text) = json["explanation"].as_str().filter(|s| !s.is_empty()) {
        return text.to_string();
    }
    if let Some(text) = json["api_message"].as_str().filter(|s| !s.is_empty()) {
        return text.to_string();
    }
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}

/// Error text for a non-2xx reply: the server's `detail` field when
/// the body carries one, otherwise a generic status line.
fn status_message(code: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["detail"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| format!("HTTP error! Status: {}", code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Spin up a one-shot HTTP server and return its base URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_explain_returns_explanation() {
        let url = serve_once(
            "200 OK",
            r#"{"explanation":"Adds two numbers.","received_code":"a + b"}"#,
        );
        let reply = request_assist(&url, 5, Action::Explain, "python", "a + b", "", "").unwrap();
        assert_eq!(reply, "Adds two numbers.");
    }

    #[test]
    fn test_api_message_fallback() {
        let url = serve_once("200 OK", r#"{"api_message":"Hello from the backend!"}"#);
        let reply = request_assist(&url, 5, Action::Explain, "python", "x = 1", "", "").unwrap();
        assert_eq!(reply, "Hello from the backend!");
    }

    #[test]
    fn test_unknown_payload_is_pretty_printed() {
        let url = serve_once("200 OK", r#"{"status":"ok"}"#);
        let reply = request_assist(&url, 5, Action::Explain, "python", "x = 1", "", "").unwrap();
        assert!(reply.contains("\"status\""));
        assert!(reply.contains("\"ok\""));
    }

    #[test]
    fn test_http_error_uses_detail_field() {
        let url = serve_once("400 Bad Request", r#"{"detail":"bad input"}"#);
        let err = request_assist(&url, 5, Action::Explain, "python", "x = 1", "", "").unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_http_error_without_detail_is_generic() {
        let url = serve_once("500 Internal Server Error", "boom");
        let err = request_assist(&url, 5, Action::Explain, "python", "x = 1", "", "").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! Status: 500");
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let err = request_assist(&url, 5, Action::Explain, "python", "x = 1", "", "").unwrap_err();
        assert!(err.to_string().starts_with("Network error:"));
    }

    #[test]
    fn test_ping_reads_api_message() {
        let url = serve_once(
            "200 OK",
            r#"{"api_message":"Hello from FastAPI backend! Your connection works!"}"#,
        );
        let reply = ping(&url, 5).unwrap();
        assert_eq!(reply, "Hello from FastAPI backend! Your connection works!");
    }

    #[test]
    fn test_explain_body_shape() {
        let body = request_body(Action::Explain, "python", "x = 1", "ignored", "ignored");
        assert_eq!(body["code"], "x = 1");
        assert_eq!(body["language"], "python");
        assert!(body.get("error_message").is_none());
        assert!(body.get("problem_description").is_none());
    }

    #[test]
    fn test_analyze_body_carries_error_message() {
        let body = request_body(
            Action::AnalyzeError,
            "python",
            "print(x)",
            "NameError: name 'x' is not defined",
            "",
        );
        assert_eq!(body["error_message"], "NameError: name 'x' is not defined");
        assert!(body.get("problem_description").is_none());
    }

    #[test]
    fn test_suggestions_body_always_has_problem_description() {
        let body = request_body(Action::Suggestions, "go", "fmt.Println(1)", "", "");
        assert_eq!(body["problem_description"], "");
    }

    #[test]
    fn test_empty_explanation_falls_through() {
        let json = serde_json::json!({"explanation": "", "api_message": "hi"});
        assert_eq!(extract_reply(&json), "hi");
    }
}
