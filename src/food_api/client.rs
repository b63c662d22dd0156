// Open Food Facts API 客户端
// 负责商品查询和搜索，所有请求使用固定超时，不做重试

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Product, ProductSource};
use crate::models::FoodApiSettings;

/// 查询商品时请求的字段
const PRODUCT_FIELDS: &str = "product_name,generic_name,nutriments";

const LOOKUP_TIMEOUT_MESSAGE: &str = "Request timed out";
const SEARCH_TIMEOUT_MESSAGE: &str = "Search request timed out";

/// 超时（包括读取响应体时超时）统一为固定文案
fn request_error(e: reqwest::Error, timeout_message: &str) -> anyhow::Error {
    if e.is_timeout() {
        anyhow!("{}", timeout_message)
    } else {
        anyhow!(e)
    }
}

/// 商品查询响应
#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    status_verbose: Option<String>,
    #[serde(default)]
    product: Option<Product>,
}

/// 搜索响应
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Option<Vec<Product>>,
}

/// Open Food Facts 客户端
#[derive(Clone)]
pub struct OpenFoodFactsClient {
    base_url: String,
    search_page_size: u32,
    client: Client,
}

impl OpenFoodFactsClient {
    /// 创建新的客户端
    pub fn new(settings: &FoodApiSettings) -> Result<Self> {
        if settings.base_url.trim().is_empty() {
            return Err(anyhow!("商品接口地址不能为空"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("protein-meter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            search_page_size: settings.search_page_size,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ProductSource for OpenFoodFactsClient {
    async fn get_product(&self, barcode: &str) -> Result<Product> {
        let url = format!("{}/api/v2/product/{}.json", self.base_url, barcode);
        debug!("查询商品: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("fields", PRODUCT_FIELDS)])
            .send()
            .await
            .map_err(|e| request_error(e, LOOKUP_TIMEOUT_MESSAGE))?;

        if !response.status().is_success() {
            warn!("商品查询失败，条码 {}，状态码 {}", barcode, response.status());
            return Err(anyhow!("HTTP error! status: {}", response.status().as_u16()));
        }

        let data: ProductResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, LOOKUP_TIMEOUT_MESSAGE))?;
        match (data.status, data.product) {
            (1, Some(mut product)) => {
                if product.code.is_none() {
                    product.code = Some(barcode.to_string());
                }
                info!("已获取商品数据，条码 {}", barcode);
                Ok(product)
            }
            _ => Err(anyhow!(data
                .status_verbose
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Product not found".to_string()))),
        }
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let url = format!("{}/cgi/search.pl", self.base_url);
        let page_size = self.search_page_size.to_string();
        debug!("搜索商品: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| request_error(e, SEARCH_TIMEOUT_MESSAGE))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!(
                "Network response was not ok: {}",
                status.canonical_reason().unwrap_or("")
            ));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| request_error(e, SEARCH_TIMEOUT_MESSAGE))?;
        let products = data.products.unwrap_or_default();
        info!("搜索 \"{}\" 返回 {} 个商品", query, products.len());
        Ok(products)
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/product/{}", self.base_url, barcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> OpenFoodFactsClient {
        client_with_timeout(server, 5)
    }

    fn client_with_timeout(server: &mockito::ServerGuard, timeout_secs: u64) -> OpenFoodFactsClient {
        OpenFoodFactsClient::new(&FoodApiSettings {
            base_url: server.url(),
            timeout_secs,
            search_page_size: 20,
        })
        .unwrap()
    }

    /// 响应体在超时之后才写出
    fn slow_body(body: &'static str) -> impl Fn(&mut dyn std::io::Write) -> std::io::Result<()> {
        move |w| {
            std::thread::sleep(Duration::from_millis(2500));
            w.write_all(body.as_bytes())
        }
    }

    #[tokio::test]
    async fn test_get_product_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/product/3017620422003.json")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_chunked_body(slow_body(r#"{"status":1,"product":{}}"#))
            .create_async()
            .await;

        let err = client_with_timeout(&server, 1)
            .get_product("3017620422003")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request timed out");
    }

    #[tokio::test]
    async fn test_search_products_timeout() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cgi/search.pl")
            .match_query(Matcher::Any)
            .with_chunked_body(slow_body(r#"{"products":[]}"#))
            .create_async()
            .await;

        let err = client_with_timeout(&server, 1)
            .search_products("tofu")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Search request timed out");
    }

    #[test]
    fn test_client_empty_base_url() {
        let settings = FoodApiSettings {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(OpenFoodFactsClient::new(&settings).is_err());
    }

    #[test]
    fn test_product_url() {
        let client = OpenFoodFactsClient::new(&FoodApiSettings::default()).unwrap();
        assert_eq!(
            client.product_url("3017620422003"),
            "https://world.openfoodfacts.org/product/3017620422003"
        );
    }

    #[tokio::test]
    async fn test_get_product_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/product/3017620422003.json")
            .match_query(Matcher::UrlEncoded(
                "fields".into(),
                PRODUCT_FIELDS.into(),
            ))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":1,"product":{"product_name":"Nutella","nutriments":{"proteins_100g":6.3,"energy-kcal_100g":539}}}"#,
            )
            .create_async()
            .await;

        let product = client_for(&server)
            .get_product("3017620422003")
            .await
            .unwrap();
        assert_eq!(product.product_name.as_deref(), Some("Nutella"));
        assert_eq!(product.code.as_deref(), Some("3017620422003"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/product/0000.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":0,"status_verbose":"product not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_product("0000").await.unwrap_err();
        assert_eq!(err.to_string(), "product not found");
    }

    #[tokio::test]
    async fn test_get_product_without_status_verbose() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/product/1111.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":0}"#)
            .create_async()
            .await;

        let err = client_for(&server).get_product("1111").await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found");
    }

    #[tokio::test]
    async fn test_get_product_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/product/2222.json")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = client_for(&server).get_product("2222").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    #[tokio::test]
    async fn test_search_products() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cgi/search.pl")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search_terms".into(), "greek yogurt".into()),
                Matcher::UrlEncoded("json".into(), "1".into()),
                Matcher::UrlEncoded("page_size".into(), "20".into()),
            ]))
            .with_body(r#"{"products":[{"code":"1","product_name":"A"},{"code":"2"}],"count":2}"#)
            .create_async()
            .await;

        let products = client_for(&server)
            .search_products("greek yogurt")
            .await
            .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].code.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_search_products_missing_list() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cgi/search.pl")
            .match_query(Matcher::Any)
            .with_body(r#"{"count":0}"#)
            .create_async()
            .await;

        let products = client_for(&server).search_products("x").await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_search_products_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cgi/search.pl")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).search_products("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Network response was not ok: Service Unavailable"
        );
    }
}
