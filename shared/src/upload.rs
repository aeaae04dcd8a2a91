use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRes {
    pub url: String,
    pub public_id: String,
    pub format: String,
    pub size: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePictureRes {
    pub url: String,
    pub public_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UploadQuery {
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProxyQuery {
    #[serde(default)]
    pub url: Option<String>,
}
