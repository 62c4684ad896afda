//! Remote store transport.
//!
//! The sync core only needs "run this named mutation/query with these JSON args";
//! [`RemoteStore`] is that seam and [`ConvexClient`] speaks the Convex HTTP API.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn mutation(&self, path: &str, args: Value) -> Result<Value>;
    async fn query(&self, path: &str, args: Value) -> Result<Value>;
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum FunctionResponse {
    Success {
        #[serde(default)]
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage", default)]
        error_message: Option<String>,
        #[serde(rename = "errorData", default)]
        error_data: Option<Value>,
    },
}

/// HTTP client for a Convex deployment (`POST /api/mutation`, `POST /api/query`).
#[derive(Debug, Clone)]
pub struct ConvexClient {
    base_url: Url,
    deploy_key: Option<String>,
    http: Client,
}

impl ConvexClient {
    pub fn new(base_url: Url, deploy_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("golf-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url,
            deploy_key,
            http,
        })
    }

    fn endpoint(&self, kind: &str) -> Result<Url> {
        self.base_url
            .join(&format!("api/{kind}"))
            .with_context(|| format!("cannot build /api/{kind} from {}", self.base_url))
    }

    async fn call(&self, kind: &str, path: &str, args: Value) -> Result<Value> {
        let url = self.endpoint(kind)?;
        let body = json!({ "path": path, "args": args, "format": "json" });
        debug!(%url, function = path, "convex call");

        let mut req = self.http.post(url).json(&body);
        if let Some(key) = &self.deploy_key {
            req = req.header(header::AUTHORIZATION, format!("Convex {key}"));
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("{kind} {path}: request failed"))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("{kind} {path}: failed to read response body"))?;

        match serde_json::from_str::<FunctionResponse>(&text) {
            Ok(FunctionResponse::Success { value }) => Ok(value),
            Ok(FunctionResponse::Error {
                error_message,
                error_data,
            }) => {
                let mut msg = error_message.unwrap_or_else(|| "unknown server error".to_string());
                if let Some(data) = error_data.filter(|d| !d.is_null()) {
                    msg.push_str(&format!(" ({data})"));
                }
                Err(anyhow!("{path} failed: {msg}"))
            }
            Err(_) if !status.is_success() => {
                bail!("{path} failed: HTTP {status}: {}", truncate(&text, 300))
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("{path}: undecodable response"))),
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait::async_trait]
impl RemoteStore for ConvexClient {
    async fn mutation(&self, path: &str, args: Value) -> Result<Value> {
        self.call("mutation", path, args).await
    }

    async fn query(&self, path: &str, args: Value) -> Result<Value> {
        self.call("query", path, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_and_error_envelopes() {
        let ok: FunctionResponse =
            serde_json::from_str(r#"{"status":"success","value":{"deleted":3},"logLines":[]}"#)
                .unwrap();
        assert!(matches!(ok, FunctionResponse::Success { value } if value["deleted"] == 3));

        let err: FunctionResponse = serde_json::from_str(
            r#"{"status":"error","errorMessage":"ArgumentValidationError: missing name"}"#,
        )
        .unwrap();
        assert!(matches!(
            err,
            FunctionResponse::Error { error_message: Some(m), .. } if m.contains("missing name")
        ));
    }

    #[test]
    fn endpoints_keep_deployment_host() {
        let client = ConvexClient::new(
            Url::parse("https://brainy-tiger-452.convex.cloud").unwrap(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("mutation").unwrap().as_str(),
            "https://brainy-tiger-452.convex.cloud/api/mutation"
        );
    }

    /// One-shot HTTP stub: answers the first request with `status`/`body` and hands
    /// back the raw request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = sock.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            String::from_utf8_lossy(&buf).into_owned()
        });
        (url, handle)
    }

    fn header_value(request: &str, name: &str) -> Option<String> {
        request.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.eq_ignore_ascii_case(name).then(|| v.trim().to_string())
        })
    }

    fn client(url: Url, key: Option<&str>) -> ConvexClient {
        ConvexClient::new(url, key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_yields_value_and_sends_deploy_key() {
        let (url, server) =
            serve_once("200 OK", r#"{"status":"success","value":{"deleted":3}}"#).await;
        let value = client(url, Some("prod:secret"))
            .mutation("tournaments:clearTournaments", json!({}))
            .await
            .unwrap();
        assert_eq!(value["deleted"], 3);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/mutation "), "{request}");
        assert_eq!(
            header_value(&request, "authorization").as_deref(),
            Some("Convex prod:secret")
        );
        assert!(request.contains(r#""path":"tournaments:clearTournaments""#));
        assert!(request.contains(r#""format":"json""#));
    }

    #[tokio::test]
    async fn queries_without_key_send_no_authorization() {
        let (url, server) = serve_once("200 OK", r#"{"status":"success","value":[]}"#).await;
        let value = client(url, None)
            .query("tournaments:getYearSummaries", json!({}))
            .await
            .unwrap();
        assert_eq!(value, json!([]));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/query "), "{request}");
        assert_eq!(header_value(&request, "authorization"), None);
    }

    #[tokio::test]
    async fn error_envelope_is_a_transport_error() {
        let (url, server) = serve_once(
            "400 Bad Request",
            r#"{"status":"error","errorMessage":"ArgumentValidationError: missing name"}"#,
        )
        .await;
        let err = client(url, None)
            .mutation("tournaments:importTournamentsBatch", json!({"tournaments": []}))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("ArgumentValidationError"), "{err:#}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_with_text_body_is_an_error() {
        let (url, server) = serve_once("500 Internal Server Error", "upstream exploded").await;
        let err = client(url, None)
            .mutation("playerPhotos:updatePlayerPhotosBatch", json!({"players": []}))
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("HTTP 500"), "{msg}");
        assert!(msg.contains("upstream exploded"), "{msg}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_success_body_is_an_error() {
        let (url, server) = serve_once("200 OK", "<html>maintenance</html>").await;
        let err = client(url, None)
            .query("playerPhotos:getPhotoUpdateStatus", json!({}))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("undecodable response"), "{err:#}");
        server.await.unwrap();
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
