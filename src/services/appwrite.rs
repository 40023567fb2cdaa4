use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Airport, Benefit, FlightOption, FlightOptionFilter, NodeId};
use crate::services::store::{ContentStore, StoreError};

/// Upper bound on documents returned by one list query
const QUERY_LIMIT: usize = 100;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub flight_options: String,
    pub airports: String,
    pub benefits: String,
    pub currencies: String,
}

/// Appwrite-backed content store
///
/// Flight option documents use the decimal node id as their `$id`.
/// `airports` and `benefits` hold ordered arrays of document ids, `currency`
/// holds a currency document id and file attributes hold storage file ids,
/// which are resolved to bucket view URLs.
pub struct AppwriteStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    bucket_id: String,
    client: Client,
    collections: AppwriteCollections,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    total: u64,
    documents: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FlightOptionDocument {
    title: String,
    icon: Option<String>,
    #[serde(rename = "isRecommend", default)]
    is_recommend: bool,
    tags: Option<String>,
    currency: Option<String>,
    #[serde(rename = "marketCode")]
    market_code: String,
    #[serde(rename = "regionCode")]
    region_code: String,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    airports: Vec<String>,
    #[serde(default)]
    benefits: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AirportDocument {
    title: String,
    icon: Option<String>,
    city: Option<String>,
    code: Option<String>,
    #[serde(default)]
    wifi: bool,
}

#[derive(Debug, Deserialize)]
struct BenefitDocument {
    title: String,
    #[serde(rename = "subTitle")]
    sub_title: Option<String>,
    #[serde(rename = "isAvailable", default)]
    is_available: bool,
    image: Option<String>,
    #[serde(rename = "toolTipText")]
    tool_tip_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrencyDocument {
    label: String,
}

impl AppwriteStore {
    /// Create a new Appwrite store
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        bucket_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            project_id,
            database_id,
            bucket_id,
            client,
            collections,
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url, self.database_id, collection
        )
    }

    /// View URL of a stored file; an unset file resolves to an empty string
    fn file_url(&self, file_id: Option<&str>) -> String {
        match file_id {
            Some(id) if !id.is_empty() => format!(
                "{}/storage/buckets/{}/files/{}/view?project={}",
                self.base_url,
                self.bucket_id,
                urlencoding::encode(id),
                urlencoding::encode(&self.project_id)
            ),
            _ => String::new(),
        }
    }

    async fn get(&self, url: &str) -> Result<Option<Value>, AppwriteError> {
        tracing::debug!("Fetching from Appwrite: {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED => Err(AppwriteError::Unauthorized),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Appwrite request failed: {} - {}", status, body);
                Err(AppwriteError::ApiError(format!("Request failed: {}", status)))
            }
            _ => Ok(Some(response.json().await?)),
        }
    }

    async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<T>, AppwriteError> {
        let url = format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(document_id)
        );

        match self.get(&url).await? {
            Some(json) => serde_json::from_value(json).map(Some).map_err(|e| {
                AppwriteError::InvalidResponse(format!(
                    "Failed to parse {} document {}: {}",
                    collection, document_id, e
                ))
            }),
            None => Ok(None),
        }
    }

    /// Load a referenced document, treating a missing one as an error
    async fn get_reference<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<T, AppwriteError> {
        self.get_document(collection, document_id)
            .await?
            .ok_or_else(|| AppwriteError::MissingReference(format!("{}/{}", collection, document_id)))
    }

    fn build_queries(filter: &FlightOptionFilter, cursor: Option<&str>) -> Result<Vec<String>, AppwriteError> {
        let encode = |value: &str| {
            serde_json::to_string(value)
                .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to encode query value: {}", e)))
        };

        let mut queries = vec![
            format!("equal(\"marketCode\", [{}])", encode(&filter.market_code)?),
            format!("equal(\"regionCode\", [{}])", encode(&filter.region_code)?),
        ];

        if let Some(published) = filter.status.published() {
            queries.push(format!("equal(\"published\", [{}])", published));
        }

        queries.push(format!("limit({})", QUERY_LIMIT));

        if let Some(cursor) = cursor {
            queries.push(format!("cursorAfter({})", encode(cursor)?));
        }

        Ok(queries)
    }

    async fn query_page(&self, filter: &FlightOptionFilter, cursor: Option<&str>) -> Result<DocumentList, AppwriteError> {
        let query_string = Self::build_queries(filter, cursor)?
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.documents_url(&self.collections.flight_options), query_string);

        let json = self
            .get(&url)
            .await?
            .ok_or_else(|| AppwriteError::ApiError(format!(
                "Collection {} not found",
                self.collections.flight_options
            )))?;

        serde_json::from_value(json)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Missing documents array: {}", e)))
    }

    /// Collect every matching document id, following `cursorAfter` until the
    /// reported total is covered
    async fn query_ids(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, AppwriteError> {
        let mut ids: Vec<NodeId> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let list = self.query_page(filter, cursor.as_deref()).await?;
            let page_len = list.documents.len();

            for doc in &list.documents {
                let id = doc
                    .get("$id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AppwriteError::InvalidResponse("Document without $id".into()))?;
                ids.push(
                    id.parse::<NodeId>()
                        .map_err(|_| AppwriteError::InvalidResponse(format!("Non-numeric document id {}", id)))?,
                );
                cursor = Some(id.to_string());
            }

            if ids.len() as u64 >= list.total || page_len < QUERY_LIMIT {
                if (ids.len() as u64) < list.total {
                    tracing::warn!(
                        "Appwrite reported {} flight option documents but returned {}",
                        list.total,
                        ids.len()
                    );
                }
                break;
            }
        }

        tracing::debug!("Queried {} flight option documents", ids.len());

        Ok(ids)
    }

    async fn load(&self, id: NodeId) -> Result<Option<FlightOption>, AppwriteError> {
        let document: FlightOptionDocument = match self
            .get_document(&self.collections.flight_options, &id.to_string())
            .await?
        {
            Some(document) => document,
            None => return Ok(None),
        };

        let mut airports = Vec::with_capacity(document.airports.len());
        for airport_id in &document.airports {
            let airport: AirportDocument = self.get_reference(&self.collections.airports, airport_id).await?;
            airports.push(Airport {
                title: airport.title,
                icon: self.file_url(airport.icon.as_deref()),
                city: airport.city.unwrap_or_default(),
                code: airport.code.unwrap_or_default(),
                wifi: airport.wifi,
            });
        }

        let mut benefits = Vec::with_capacity(document.benefits.len());
        for benefit_id in &document.benefits {
            let benefit: BenefitDocument = self.get_reference(&self.collections.benefits, benefit_id).await?;
            benefits.push(Benefit {
                title: benefit.title,
                sub_title: benefit.sub_title.unwrap_or_default(),
                is_available: benefit.is_available,
                image: self.file_url(benefit.image.as_deref()),
                tooltip_text: benefit.tool_tip_text.unwrap_or_default(),
            });
        }

        let currency = match document.currency.as_deref() {
            Some(currency_id) if !currency_id.is_empty() => {
                let currency: CurrencyDocument =
                    self.get_reference(&self.collections.currencies, currency_id).await?;
                currency.label
            }
            _ => String::new(),
        };

        Ok(Some(FlightOption {
            id,
            title: document.title,
            icon: self.file_url(document.icon.as_deref()),
            is_recommend: document.is_recommend,
            tags: document.tags.unwrap_or_default(),
            currency,
            market_code: document.market_code,
            region_code: document.region_code,
            published: document.published,
            airports,
            benefits,
        }))
    }
}

#[async_trait]
impl ContentStore for AppwriteStore {
    async fn find_flight_options(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, StoreError> {
        Ok(self.query_ids(filter).await?)
    }

    async fn load_flight_option(&self, id: NodeId) -> Result<Option<FlightOption>, StoreError> {
        Ok(self.load(id).await?)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await
            .map_err(AppwriteError::from)?;

        Ok(response.status().is_success())
    }

    fn backend(&self) -> &'static str {
        "appwrite"
    }
}
