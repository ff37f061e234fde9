/// 题库存储客户端
///
/// 封装发布阶段与外部题库之间的读写：读取已有题干用于查重，逐条插入新记录。
/// 插入不做事务，部分失败不回滚。
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, StoreError};
use crate::models::publication::PublicationRecord;

/// 本地存储文件名（位于 approved/ 目录）
pub const PUBLISHED_FILE: &str = "published.json";

/// 题库存储接口
pub trait QuestionStore: Send + Sync {
    /// 读取已有题目的题干
    fn existing_stems(&self) -> impl Future<Output = AppResult<Vec<String>>> + Send;

    /// 插入一条记录
    fn insert(&self, record: &PublicationRecord) -> impl Future<Output = AppResult<()>> + Send;
}

#[derive(Deserialize)]
struct StemRow {
    pregunta: String,
}

/// PostgREST 风格的 HTTP 存储
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestStore {
    /// 创建新的 HTTP 存储客户端
    ///
    /// # 参数
    /// - `base_url`: 服务地址（不含 `/rest/v1`）
    /// - `api_key`: 访问密钥
    /// - `table`: 表名
    pub fn new(base_url: &str, api_key: impl Into<String>, table: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(v) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", v);
        }
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }

    async fn check_status(&self, response: reqwest::Response) -> AppResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!("题库返回错误响应: status={}, body={}", status, body);
        Err(AppError::Store(StoreError::BadResponse {
            endpoint: self.endpoint.clone(),
            status,
            body,
        }))
    }
}

impl QuestionStore for RestStore {
    async fn existing_stems(&self) -> AppResult<Vec<String>> {
        let url = format!("{}?select=pregunta", self.endpoint);
        debug!("读取已有题干: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| AppError::store_request_failed(&url, e))?;
        let rows: Vec<StemRow> = self
            .check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::store_request_failed(&url, e))?;

        Ok(rows.into_iter().map(|r| r.pregunta).collect())
    }

    async fn insert(&self, record: &PublicationRecord) -> AppResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers())
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::store_request_failed(&self.endpoint, e))?;
        self.check_status(response).await?;
        Ok(())
    }
}

/// 本地 JSON 文件存储
///
/// 没有配置题库地址时使用，记录追加到 `published.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 在目录下使用默认文件名
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PUBLISHED_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> AppResult<Vec<PublicationRecord>> {
        let path = self.path.display().to_string();
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| AppError::json_parse_failed(&path, e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::file_read_failed(&path, e)),
        }
    }
}

impl QuestionStore for FileStore {
    async fn existing_stems(&self) -> AppResult<Vec<String>> {
        Ok(self.load().await?.into_iter().map(|r| r.stem).collect())
    }

    async fn insert(&self, record: &PublicationRecord) -> AppResult<()> {
        let mut records = self.load().await?;
        records.push(record.clone());
        crate::models::save_json(&self.path, &records).await
    }
}

/// 根据配置选择的存储后端
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Rest(RestStore),
    File(FileStore),
}

impl StoreBackend {
    /// 配置了 `store_url` 时使用 HTTP 存储，否则写本地文件
    pub fn from_config(config: &Config) -> Self {
        match &config.store_url {
            Some(url) if !url.is_empty() => StoreBackend::Rest(RestStore::new(
                url,
                config.store_api_key.clone().unwrap_or_default(),
                &config.store_table,
            )),
            _ => StoreBackend::File(FileStore::in_dir(&config.approved_dir())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StoreBackend::Rest(s) => s.endpoint().to_string(),
            StoreBackend::File(s) => s.path().display().to_string(),
        }
    }
}

impl QuestionStore for StoreBackend {
    async fn existing_stems(&self) -> AppResult<Vec<String>> {
        match self {
            StoreBackend::Rest(s) => s.existing_stems().await,
            StoreBackend::File(s) => s.existing_stems().await,
        }
    }

    async fn insert(&self, record: &PublicationRecord) -> AppResult<()> {
        match self {
            StoreBackend::Rest(s) => s.insert(record).await,
            StoreBackend::File(s) => s.insert(record).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::ReviewStatus;
    use crate::models::question::{AnswerOption, Question};

    fn record(stem: &str) -> PublicationRecord {
        let q = Question {
            question_text: stem.to_string(),
            options: vec![AnswerOption::correct("a"), AnswerOption::new("b")],
            ..Question::default()
        };
        PublicationRecord::from_question(&q, ReviewStatus::AutoApproved)
    }

    #[tokio::test]
    async fn file_store_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert!(store.existing_stems().await.unwrap().is_empty());

        store.insert(&record("¿Primera?")).await.unwrap();
        store.insert(&record("¿Segunda?")).await.unwrap();
        assert_eq!(store.existing_stems().await.unwrap(), vec!["¿Primera?", "¿Segunda?"]);
    }

    #[test]
    fn corrupt_store_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{no es json").unwrap();

        let err = tokio_test::block_on(store.existing_stems()).unwrap_err();
        assert!(matches!(
            err,
            AppError::File(crate::error::FileError::JsonParseFailed { .. })
        ));
    }

    #[test]
    fn backend_follows_config() {
        let config = Config::default();
        assert!(matches!(StoreBackend::from_config(&config), StoreBackend::File(_)));

        let config = Config {
            store_url: Some("https://db.example.org/".to_string()),
            ..Config::default()
        };
        match StoreBackend::from_config(&config) {
            StoreBackend::Rest(s) => {
                assert_eq!(s.endpoint(), "https://db.example.org/rest/v1/questions")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
