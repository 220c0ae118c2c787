//! Minimal WebHDFS REST client: MKDIRS, CREATE and GETFILESTATUS.

mod message;

pub use message::{FileStatus, FileStatusType};

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_url;
use message::{BooleanResp, FileStatusWrapper, LocationResp, RemoteExceptionWrapper};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client, Response, StatusCode};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone)]
pub struct WebHdfsClient {
    client: Client,
    base_url: Url,
    user: String,
}

impl WebHdfsClient {
    /// 建立 client；不會發出任何請求
    pub fn connect(base_url: &str, user: &str) -> Result<Self> {
        validate_url("webhdfs.url", base_url)?;
        let base_url = Url::parse(base_url).map_err(|e| EtlError::ConfigError {
            message: format!("Invalid WebHDFS URL '{}': {}", base_url, e),
        })?;

        // CREATE 的 datanode 轉址由我們自己處理，才能把檔案內容送到正確位置
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;

        Ok(Self {
            client,
            base_url,
            user: user.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn op_url(&self, path: &str, op: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!(
            "{}/webhdfs/v1/{}",
            prefix,
            path.trim_start_matches('/')
        ));
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            query.append_pair("op", op);
            query.append_pair("user.name", &self.user);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        url
    }

    pub async fn make_dirs(&self, path: &str) -> Result<bool> {
        let url = self.op_url(path, "MKDIRS", &[]);
        tracing::debug!("PUT {}", url);

        let resp = self.client.put(url).send().await?;
        let resp = check_status(resp).await?;
        let body: BooleanResp = resp.json().await?;
        Ok(body.boolean)
    }

    /// 兩段式上傳：namenode 回傳 datanode 位址，再把檔案串流過去
    pub async fn upload(&self, remote_path: &str, local_path: &Path, overwrite: bool) -> Result<()> {
        let overwrite = if overwrite { "true" } else { "false" };
        let url = self.op_url(
            remote_path,
            "CREATE",
            &[("overwrite", overwrite), ("noredirect", "true")],
        );
        tracing::debug!("PUT {}", url);

        let resp = self
            .client
            .put(url)
            .header(CONTENT_LENGTH, 0)
            .send()
            .await?;
        let location = datanode_location(resp).await?;
        tracing::debug!("PUT {} (datanode)", location);

        let file = tokio::fs::File::open(local_path).await?;
        let length = file.metadata().await?.len();

        let resp = self
            .client
            .put(location)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(file)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    pub async fn status(&self, path: &str) -> Result<FileStatus> {
        let url = self.op_url(path, "GETFILESTATUS", &[]);
        tracing::debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        let resp = check_status(resp).await?;
        let body: FileStatusWrapper = resp.json().await?;
        Ok(body.file_status)
    }
}

async fn datanode_location(resp: Response) -> Result<String> {
    if resp.status().is_redirection() {
        return resp
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| EtlError::ProcessingError {
                message: "WebHDFS redirect without Location header".to_string(),
            });
    }

    let resp = check_status(resp).await?;
    let body: LocationResp = resp.json().await?;
    Ok(body.location)
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(parse_error(status, &body))
}

fn parse_error(status: StatusCode, body: &str) -> EtlError {
    match serde_json::from_str::<RemoteExceptionWrapper>(body) {
        Ok(wrapper) => EtlError::WebHdfsError {
            status: status.as_u16(),
            exception: wrapper.remote_exception.exception,
            message: wrapper.remote_exception.message,
        },
        Err(_) => EtlError::WebHdfsError {
            status: status.as_u16(),
            exception: status
                .canonical_reason()
                .unwrap_or("Unexpected status")
                .to_string(),
            message: body.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_url_encodes_path_and_user() {
        let client = WebHdfsClient::connect("http://localhost:9870", "root").unwrap();
        let url = client.op_url("/data/lastfm data.csv", "GETFILESTATUS", &[]);
        assert_eq!(
            url.as_str(),
            "http://localhost:9870/webhdfs/v1/data/lastfm%20data.csv?op=GETFILESTATUS&user.name=root"
        );
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        assert!(WebHdfsClient::connect("localhost:9870", "root").is_err());
    }

    #[test]
    fn test_parse_error_without_remote_exception() {
        let err = parse_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            EtlError::WebHdfsError {
                status,
                exception,
                message,
            } => {
                assert_eq!(status, 502);
                assert_eq!(exception, "Bad Gateway");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
