//! # Subgraph Balance Client
//!
//! Reads non-zero ERC-20 balances for one token at one block height from a
//! GraphQL indexing service.
//!
//! ## Request
//!
//! `POST {endpoint}` with body `{ "query": ..., "variables": { block,
//! symbol, first, cursor } }`. Rows are ordered by `id` and paginated with
//! an `id_gt` cursor until a page comes back shorter than `first`.
//!
//! ## Trust
//!
//! The query already filters zero balances and missing owners, but rows are
//! still treated as untrusted: [`RawBalance`] keeps the owner optional and
//! the value as text so the claim builder can filter and validate them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SubgraphConfig;
use crate::error::SnapshotError;

const BALANCES_QUERY: &str = r#"
query NonZeroBalancesAtBlock($block: Int!, $symbol: String!, $first: Int!, $cursor: String!) {
  erc20Balances(
    block: { number: $block }
    first: $first
    orderBy: id
    orderDirection: asc
    where: {
      and: [
        { contract_: { symbol: $symbol } }
        { value_not: "0" }
        { account_not: null }
        { id_gt: $cursor }
      ]
    }
  ) {
    id
    account {
      id
    }
    valueExact
  }
}
"#;

/// One holder row as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBalance {
    /// Owner address; `None` when the indexer has no owner for the balance.
    pub account: Option<String>,
    /// Exact balance in base units, as decimal text.
    pub value_exact: String,
}

/// A read-only source of balances at a block height.
#[allow(async_fn_in_trait)]
pub trait BalanceSource {
    /// Every qualifying balance at `block`.
    async fn balances_at(&self, block: u64) -> Result<Vec<RawBalance>, SnapshotError>;
}

// -- Wire types ---------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: BalanceVariables<'a>,
}

#[derive(Debug, Serialize)]
struct BalanceVariables<'a> {
    block: u64,
    symbol: &'a str,
    first: usize,
    cursor: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalancesPage {
    erc20_balances: Vec<BalanceRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceRow {
    id: String,
    #[serde(default)]
    account: Option<AccountRef>,
    value_exact: String,
}

#[derive(Debug, Deserialize)]
struct AccountRef {
    id: String,
}

// -- Client -------------------------------------------------------------------

/// HTTP client for the balance subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphClient {
    http: reqwest::Client,
    config: SubgraphConfig,
}

impl SubgraphClient {
    /// Build a client from configuration.
    pub fn new(config: SubgraphConfig) -> Result<Self, SnapshotError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SnapshotError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &SubgraphConfig {
        &self.config
    }

    async fn fetch_page(&self, block: u64, cursor: &str) -> Result<Vec<BalanceRow>, SnapshotError> {
        let endpoint = format!("POST {}", self.config.endpoint);
        let body = GraphQlRequest {
            query: BALANCES_QUERY,
            variables: BalanceVariables {
                block,
                symbol: &self.config.token_symbol,
                first: self.config.page_size,
                cursor,
            },
        };

        let resp = self
            .http
            .post(self.config.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| SnapshotError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(SnapshotError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        let parsed: GraphQlResponse<BalancesPage> =
            resp.json()
                .await
                .map_err(|e| SnapshotError::Deserialization {
                    endpoint: endpoint.clone(),
                    source: e,
                })?;

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            return Err(SnapshotError::GraphQl {
                endpoint,
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        parsed
            .data
            .map(|page| page.erc20_balances)
            .ok_or(SnapshotError::EmptyResponse { endpoint })
    }
}

impl BalanceSource for SubgraphClient {
    async fn balances_at(&self, block: u64) -> Result<Vec<RawBalance>, SnapshotError> {
        let mut out = Vec::new();
        let mut cursor = String::new();
        loop {
            let page = self.fetch_page(block, &cursor).await?;
            let full = page.len() >= self.config.page_size;
            tracing::debug!(block, cursor = %cursor, rows = page.len(), "fetched balance page");
            let Some(last) = page.last() else {
                break;
            };
            cursor = last.id.clone();
            out.extend(page.into_iter().map(|row| RawBalance {
                account: row.account.map(|a| a.id),
                value_exact: row.value_exact,
            }));
            if !full {
                break;
            }
        }
        tracing::info!(
            block,
            symbol = %self.config.token_symbol,
            rows = out.len(),
            "balance snapshot fetched"
        );
        Ok(out)
    }
}
