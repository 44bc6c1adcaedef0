use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::{BrokerExecution, MarketDataProvider};
use crate::config::{Credentials, TradingEnvironment};
use crate::error::ApiError;
use crate::models::{Candle, OrderReceipt, OrderRequest, PositionStatus};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the OANDA v20 REST API
///
/// Serves as both the market data provider and the execution service.
#[derive(Clone)]
pub struct OandaClient {
    client: Client,
    base_url: String,
    access_token: String,
}

// ============== Response Types ==============

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
    error_message: Option<String>,
    order_reject_transaction: Option<RejectTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectTransaction {
    reject_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    candles: Vec<RawCandle>,
}

#[derive(Debug, Deserialize)]
struct RawCandle {
    time: DateTime<Utc>,
    volume: f64,
    complete: bool,
    mid: Option<RawOhlc>,
}

/// OANDA sends prices as decimal strings
#[derive(Debug, Deserialize)]
struct RawOhlc {
    o: String,
    h: String,
    l: String,
    c: String,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    position: RawPosition,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    long: RawPositionSide,
    short: RawPositionSide,
}

#[derive(Debug, Deserialize)]
struct RawPositionSide {
    units: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderCreateResponse {
    order_create_transaction: Option<TransactionRef>,
    order_fill_transaction: Option<FillTransaction>,
    order_cancel_transaction: Option<CancelTransaction>,
}

#[derive(Debug, Deserialize)]
struct TransactionRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FillTransaction {
    id: String,
    price: Option<String>,
    trade_opened: Option<TradeOpened>,
}

#[derive(Debug, Deserialize)]
struct TradeOpened {
    #[serde(rename = "tradeID")]
    trade_id: String,
}

#[derive(Debug, Deserialize)]
struct CancelTransaction {
    reason: Option<String>,
}

fn parse_price(field: &str, value: &str) -> Result<f64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::Decode(format!("invalid {} price '{}'", field, value)))
}

fn parse_units(value: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .map_err(|_| ApiError::Decode(format!("invalid position units '{}'", value)))
}

impl TryFrom<RawCandle> for Candle {
    type Error = ApiError;

    fn try_from(raw: RawCandle) -> Result<Self, Self::Error> {
        let mid = raw
            .mid
            .ok_or_else(|| ApiError::Decode(format!("candle at {} has no mid prices", raw.time)))?;

        Ok(Candle {
            timestamp: raw.time,
            open: parse_price("open", &mid.o)?,
            high: parse_price("high", &mid.h)?,
            low: parse_price("low", &mid.l)?,
            close: parse_price("close", &mid.c)?,
            volume: raw.volume,
            complete: raw.complete,
        })
    }
}

// ============== Implementation ==============

impl OandaClient {
    pub fn new(credentials: &Credentials, environment: TradingEnvironment) -> Result<Self, ApiError> {
        Self::with_base_url(environment.api_base(), &credentials.access_token)
    }

    /// Point the client at another host (used against mock servers)
    pub fn with_base_url(base_url: &str, access_token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .header("Accept-Datetime-Format", "RFC3339")
    }

    /// Turn a non-success response into a classified error
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        let code = body
            .error_code
            .unwrap_or_else(|| status.as_u16().to_string());
        let mut message = body.error_message.unwrap_or(text);
        if let Some(reason) = body.order_reject_transaction.and_then(|t| t.reject_reason) {
            message = format!("{} (reject reason: {})", message, reason);
        }

        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound { code, message }
        } else {
            ApiError::Status {
                status: status.as_u16(),
                code,
                message,
            }
        }
    }
}

impl MarketDataProvider for OandaClient {
    /// Endpoint: GET /v3/instruments/{instrument}/candles?count={count}&granularity={granularity}&price=M
    async fn fetch_candles(
        &self,
        instrument: &str,
        granularity: &str,
        count: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        let path = format!("/v3/instruments/{}/candles", instrument);
        let count = count.to_string();

        tracing::debug!(instrument, granularity, count = %count, "Fetching candles");

        let response = self
            .get(&path)
            .query(&[
                ("count", count.as_str()),
                ("granularity", granularity),
                ("price", "M"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let data: CandlesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let candles = data
            .candles
            .into_iter()
            .map(Candle::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(instrument, fetched = candles.len(), "Fetched candles");

        Ok(candles)
    }
}

impl BrokerExecution for OandaClient {
    /// Endpoint: GET /v3/accounts/{account}/positions/{instrument}
    async fn position(
        &self,
        account_id: &str,
        instrument: &str,
    ) -> Result<PositionStatus, ApiError> {
        let path = format!("/v3/accounts/{}/positions/{}", account_id, instrument);
        let response = self.get(&path).send().await?;

        if !response.status().is_success() {
            let err = Self::error_from(response).await;
            if err.is_not_found() {
                tracing::debug!(instrument, error = %err, "No position record");
                return Ok(PositionStatus::NotPresent);
            }
            return Err(err);
        }

        let data: PositionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(PositionStatus::from_units(
            parse_units(&data.position.long.units)?,
            parse_units(&data.position.short.units)?,
        ))
    }

    /// Endpoint: POST /v3/accounts/{account}/orders
    async fn submit_order(
        &self,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, ApiError> {
        let url = format!("{}/v3/accounts/{}/orders", self.base_url, account_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header("Accept-Datetime-Format", "RFC3339")
            .json(&order.to_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let parsed: OrderCreateResponse =
            serde_json::from_value(raw.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;

        // FOK orders that cannot fill come back 201 with a cancel transaction
        if let Some(cancel) = parsed.order_cancel_transaction {
            return Err(ApiError::Rejected(format!(
                "order cancelled: {}",
                cancel.reason.unwrap_or_else(|| "unknown reason".to_string())
            )));
        }

        let created = parsed
            .order_create_transaction
            .ok_or_else(|| ApiError::Decode("response has no orderCreateTransaction".to_string()))?;

        let fill = parsed.order_fill_transaction;
        let fill_price = match fill.as_ref().and_then(|f| f.price.as_deref()) {
            Some(price) => Some(parse_price("fill", price)?),
            None => None,
        };

        Ok(OrderReceipt {
            order_id: created.id,
            fill_id: fill.as_ref().map(|f| f.id.clone()),
            trade_id: fill.and_then(|f| f.trade_opened).map(|t| t.trade_id),
            fill_price,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const TOKEN: &str = "test-token";
    const ACCOUNT: &str = "101-004-1234567-001";

    fn client_for(server: &mockito::Server) -> OandaClient {
        OandaClient::with_base_url(&server.url(), TOKEN).unwrap()
    }

    fn sample_order() -> OrderRequest {
        OrderRequest {
            instrument: "EUR_USD".to_string(),
            units: 600,
            take_profit: "1.10300".to_string(),
            stop_loss: "1.09850".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_candles() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/instruments/EUR_USD/candles")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("count".into(), "2".into()),
                Matcher::UrlEncoded("granularity".into(), "M5".into()),
                Matcher::UrlEncoded("price".into(), "M".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "instrument": "EUR_USD",
                    "granularity": "M5",
                    "candles": [
                        {"complete": true, "volume": 87, "time": "2024-03-01T10:00:00.000000000Z",
                         "mid": {"o": "1.08012", "h": "1.08050", "l": "1.07990", "c": "1.08031"}},
                        {"complete": false, "volume": 12, "time": "2024-03-01T10:05:00.000000000Z",
                         "mid": {"o": "1.08031", "h": "1.08040", "l": "1.08020", "c": "1.08025"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let candles = client_for(&server)
            .fetch_candles("EUR_USD", "M5", 2)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 1.08012);
        assert_eq!(candles[0].close, 1.08031);
        assert_eq!(candles[0].volume, 87.0);
        assert!(candles[0].complete);
        assert!(!candles[1].complete);
        assert!(candles[0].timestamp < candles[1].timestamp);
    }

    #[tokio::test]
    async fn test_fetch_candles_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/instruments/EUR_USD/candles")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_candles("EUR_USD", "M5", 100)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_candles_bad_price() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/instruments/EUR_USD/candles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"candles": [{"complete": true, "volume": 1, "time": "2024-03-01T10:00:00Z",
                    "mid": {"o": "abc", "h": "1.1", "l": "1.0", "c": "1.05"}}]}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_candles("EUR_USD", "M5", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_position_open() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/accounts/101-004-1234567-001/positions/EUR_USD")
            .with_status(200)
            .with_body(
                r#"{"position": {"instrument": "EUR_USD",
                    "long": {"units": "500", "pl": "0.0"},
                    "short": {"units": "0", "pl": "0.0"}},
                    "lastTransactionID": "42"}"#,
            )
            .create_async()
            .await;

        let status = client_for(&server).position(ACCOUNT, "EUR_USD").await.unwrap();
        assert_eq!(
            status,
            PositionStatus::Open {
                long_units: 500.0,
                short_units: 0.0
            }
        );
    }

    #[tokio::test]
    async fn test_fractional_position_counts_as_open() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/accounts/101-004-1234567-001/positions/EUR_USD")
            .with_status(200)
            .with_body(r#"{"position": {"long": {"units": "0.5"}, "short": {"units": "0"}}}"#)
            .create_async()
            .await;

        let status = client_for(&server).position(ACCOUNT, "EUR_USD").await.unwrap();
        assert_eq!(
            status,
            PositionStatus::Open {
                long_units: 0.5,
                short_units: 0.0
            }
        );
    }

    #[tokio::test]
    async fn test_position_flat() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/accounts/101-004-1234567-001/positions/EUR_USD")
            .with_status(200)
            .with_body(r#"{"position": {"long": {"units": "0"}, "short": {"units": "0"}}}"#)
            .create_async()
            .await;

        let status = client_for(&server).position(ACCOUNT, "EUR_USD").await.unwrap();
        assert_eq!(status, PositionStatus::Flat);
    }

    #[tokio::test]
    async fn test_position_not_found_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/accounts/101-004-1234567-001/positions/EUR_USD")
            .with_status(404)
            .with_body(
                r#"{"errorCode": "NO_SUCH_POSITION",
                    "errorMessage": "The requested position does not exist"}"#,
            )
            .create_async()
            .await;

        let status = client_for(&server).position(ACCOUNT, "EUR_USD").await.unwrap();
        assert_eq!(status, PositionStatus::NotPresent);
    }

    #[tokio::test]
    async fn test_position_unauthorized_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v3/accounts/101-004-1234567-001/positions/EUR_USD")
            .with_status(401)
            .with_body(r#"{"errorMessage": "Insufficient authorization to perform request."}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .position(ACCOUNT, "EUR_USD")
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, message, .. } => {
                assert_eq!(status, 401);
                assert!(message.contains("authorization"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_order_filled() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/accounts/101-004-1234567-001/orders")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "order": {
                    "units": "600",
                    "instrument": "EUR_USD",
                    "type": "MARKET",
                    "timeInForce": "FOK",
                    "takeProfitOnFill": {"price": "1.10300"},
                    "stopLossOnFill": {"price": "1.09850"}
                }
            })))
            .with_status(201)
            .with_body(
                r#"{"orderCreateTransaction": {"id": "6356", "type": "MARKET_ORDER"},
                    "orderFillTransaction": {"id": "6357", "price": "1.10002",
                        "tradeOpened": {"tradeID": "6357", "units": "600"}},
                    "relatedTransactionIDs": ["6356", "6357", "6358", "6359"],
                    "lastTransactionID": "6359"}"#,
            )
            .create_async()
            .await;

        let receipt = client_for(&server)
            .submit_order(ACCOUNT, &sample_order())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.order_id, "6356");
        assert_eq!(receipt.fill_id.as_deref(), Some("6357"));
        assert_eq!(receipt.trade_id.as_deref(), Some("6357"));
        assert_eq!(receipt.fill_price, Some(1.10002));
        assert_eq!(receipt.raw["lastTransactionID"], "6359");
    }

    #[tokio::test]
    async fn test_submit_order_fok_cancelled() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v3/accounts/101-004-1234567-001/orders")
            .with_status(201)
            .with_body(
                r#"{"orderCreateTransaction": {"id": "7001"},
                    "orderCancelTransaction": {"id": "7002", "reason": "MARKET_HALTED"}}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .submit_order(ACCOUNT, &sample_order())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Rejected(ref msg) if msg.contains("MARKET_HALTED")));
    }

    #[tokio::test]
    async fn test_submit_order_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v3/accounts/101-004-1234567-001/orders")
            .with_status(400)
            .with_body(
                r#"{"orderRejectTransaction": {"rejectReason": "TAKE_PROFIT_ON_FILL_LOSS"},
                    "errorCode": "TAKE_PROFIT_ON_FILL_LOSS",
                    "errorMessage": "The take profit would result in a loss"}"#,
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .submit_order(ACCOUNT, &sample_order())
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, "TAKE_PROFIT_ON_FILL_LOSS");
                assert!(message.contains("reject reason"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
