//! WebHDFS response bodies

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct BooleanResp {
    pub boolean: bool,
}

/// `op=CREATE&noredirect=true` 回傳的 datanode 位址
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct LocationResp {
    pub location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct FileStatusWrapper {
    pub file_status: FileStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub length: u64,
    #[serde(default)]
    pub modification_time: i64,
    #[serde(default)]
    pub owner: String,
    #[serde(rename = "type")]
    pub ty: FileStatusType,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatusType {
    Directory,
    #[default]
    File,
    Symlink,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RemoteExceptionWrapper {
    pub remote_exception: RemoteException,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoteException {
    pub exception: String,
    pub message: String,
}
