//! HTTP client that simulates a browser app calling the proxy

use reqwest::{Client, Method};

use crate::types::ProxyResponse;

/// Build an HTTP client
pub fn build_client() -> Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

/// POST a JSON body to a proxy route
pub async fn send_json(
    client: &Client,
    proxy_addr: &str,
    path: &str,
    request_body: serde_json::Value,
) -> anyhow::Result<ProxyResponse> {
    send_raw(client, proxy_addr, Method::POST, path, request_body.to_string()).await
}

/// Send an arbitrary method and body to a proxy route
pub async fn send_raw(
    client: &Client,
    proxy_addr: &str,
    method: Method,
    path: &str,
    body: String,
) -> anyhow::Result<ProxyResponse> {
    let url = format!("http://{proxy_addr}{path}");

    let resp = client
        .request(method, &url)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send request to proxy: {}", e))?;

    let status = resp.status().as_u16();
    let body_text = resp
        .text()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read proxy response: {}", e))?;

    let body: serde_json::Value = serde_json::from_str(&body_text).map_err(|e| {
        anyhow::anyhow!(
            "Proxy response is not valid JSON: {}: {}",
            e,
            body_text.chars().take(500).collect::<String>()
        )
    })?;

    Ok(ProxyResponse { status, body })
}
