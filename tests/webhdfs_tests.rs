use httpmock::prelude::*;
use lastfm_etl::core::rest_transfer::WebHdfsUploader;
use lastfm_etl::domain::model::TransferTarget;
use lastfm_etl::{EtlError, WebHdfsClient};
use serde_json::json;
use tempfile::TempDir;

const CSV: &str = "id,tags\n1,['x']\n";

fn local_csv() -> (TempDir, TransferTarget) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lastfm_data.csv");
    std::fs::write(&path, CSV).unwrap();
    let target = TransferTarget::new(path.to_string_lossy(), "/data/lastfm_data.csv");
    (dir, target)
}

fn file_status(length: usize) -> serde_json::Value {
    json!({
        "FileStatus": {
            "accessTime": 0,
            "blockSize": 134217728,
            "group": "supergroup",
            "length": length,
            "modificationTime": 1760608800000u64,
            "owner": "root",
            "pathSuffix": "",
            "permission": "644",
            "replication": 3,
            "type": "FILE"
        }
    })
}

#[tokio::test]
async fn test_upload_follows_noredirect_location() {
    let server = MockServer::start_async().await;
    let (_dir, target) = local_csv();

    let mkdirs = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/webhdfs/v1/data")
                .query_param("op", "MKDIRS")
                .query_param("user.name", "root");
            then.status(200).json_body(json!({"boolean": true}));
        })
        .await;

    let create = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/webhdfs/v1/data/lastfm_data.csv")
                .query_param("op", "CREATE")
                .query_param("overwrite", "true")
                .query_param("noredirect", "true");
            then.status(200).json_body(json!({
                "Location": server.url("/datanode/webhdfs/v1/data/lastfm_data.csv?op=CREATE&overwrite=true")
            }));
        })
        .await;

    let datanode = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/datanode/webhdfs/v1/data/lastfm_data.csv")
                .body(CSV);
            then.status(201);
        })
        .await;

    let status = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/webhdfs/v1/data/lastfm_data.csv")
                .query_param("op", "GETFILESTATUS");
            then.status(200).json_body(file_status(CSV.len()));
        })
        .await;

    let client = WebHdfsClient::connect(&server.base_url(), "root").unwrap();
    let info = WebHdfsUploader::new(client, true)
        .upload(&target)
        .await
        .unwrap();

    mkdirs.assert_async().await;
    create.assert_async().await;
    datanode.assert_async().await;
    status.assert_async().await;
    assert_eq!(info.path, "/data/lastfm_data.csv");
    assert_eq!(info.length, CSV.len() as u64);
}

#[tokio::test]
async fn test_upload_follows_redirect_header_and_ignores_mkdirs_failure() {
    let server = MockServer::start_async().await;
    let (_dir, target) = local_csv();

    let mkdirs = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/webhdfs/v1/data")
                .query_param("op", "MKDIRS");
            then.status(403).json_body(json!({
                "RemoteException": {
                    "exception": "AccessControlException",
                    "javaClassName": "org.apache.hadoop.security.AccessControlException",
                    "message": "Permission denied: user=root, access=WRITE"
                }
            }));
        })
        .await;

    let create = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/webhdfs/v1/data/lastfm_data.csv")
                .query_param("op", "CREATE");
            then.status(307).header(
                "Location",
                server.url("/datanode/webhdfs/v1/data/lastfm_data.csv?op=CREATE"),
            );
        })
        .await;

    let datanode = server
        .mock_async(|when, then| {
            when.method(PUT).path("/datanode/webhdfs/v1/data/lastfm_data.csv");
            then.status(201);
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/webhdfs/v1/data/lastfm_data.csv")
                .query_param("op", "GETFILESTATUS");
            then.status(200).json_body(file_status(CSV.len()));
        })
        .await;

    let client = WebHdfsClient::connect(&server.base_url(), "root").unwrap();
    let info = WebHdfsUploader::new(client, true)
        .upload(&target)
        .await
        .unwrap();

    mkdirs.assert_async().await;
    create.assert_async().await;
    datanode.assert_async().await;
    assert_eq!(info.length, CSV.len() as u64);
}

#[tokio::test]
async fn test_existing_file_without_overwrite_fails() {
    let server = MockServer::start_async().await;
    let (_dir, target) = local_csv();

    server
        .mock_async(|when, then| {
            when.method(PUT).query_param("op", "MKDIRS");
            then.status(200).json_body(json!({"boolean": true}));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/webhdfs/v1/data/lastfm_data.csv")
                .query_param("op", "CREATE")
                .query_param("overwrite", "false");
            then.status(403).json_body(json!({
                "RemoteException": {
                    "exception": "FileAlreadyExistsException",
                    "javaClassName": "org.apache.hadoop.fs.FileAlreadyExistsException",
                    "message": "/data/lastfm_data.csv for client 172.18.0.1 already exists"
                }
            }));
        })
        .await;

    let client = WebHdfsClient::connect(&server.base_url(), "root").unwrap();
    let err = WebHdfsUploader::new(client, false)
        .upload(&target)
        .await
        .unwrap_err();

    match err {
        EtlError::WebHdfsError {
            status, exception, ..
        } => {
            assert_eq!(status, 403);
            assert_eq!(exception, "FileAlreadyExistsException");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_local_file_sends_no_request() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(500);
        })
        .await;

    let client = WebHdfsClient::connect(&server.base_url(), "root").unwrap();
    let target = TransferTarget::new("/nonexistent/lastfm_data.csv", "/data/lastfm_data.csv");
    let err = WebHdfsUploader::new(client, true)
        .upload(&target)
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::LocalFileNotFound { .. }));
    any.assert_hits_async(0).await;
}
