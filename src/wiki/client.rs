//! MediaWiki client
//!
//! This module wraps every request the mirror makes against the wiki:
//! - Building the HTTP client with the identifying user agent and cookie store
//! - The token-based login flow
//! - Paginated `action=query` listings driven by continuation tokens
//! - Single-record property lookups
//! - Rendered page bodies and raw assets from `index.php` / `load.php`
//!
//! A semaphore caps the number of requests in flight against the wiki host.

use crate::config::{Config, UserAgentConfig};
use crate::wiki::types::{LoginResponse, PageInfo, PageLinks, PageListing, TokenQueryResponse};
use crate::{MirrorError, Result};
use futures::stream::{self, Stream, StreamExt};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use url::Url;

/// Builds the HTTP client used for every wiki request
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Overall timeout of a single request
/// * `jar` - Cookie store that receives the session cookie
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
    jar: Arc<Jar>,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .cookie_provider(jar)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client facade over the MediaWiki action API and `index.php`
pub struct WikiClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    api_url: Url,
    index_url: Url,
    assert_user: String,
    language: String,
    permits: Semaphore,
}

impl WikiClient {
    /// Creates an unauthenticated client for the wiki named in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.wiki.base_url)?;
        let jar = Arc::new(Jar::default());
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
            Arc::clone(&jar),
        )?;

        Ok(Self {
            client,
            jar,
            api_url: base_url.join("api.php")?,
            index_url: base_url.join("index.php")?,
            base_url,
            assert_user: assert_user_name(&config.username).to_string(),
            language: config.wiki.language.clone(),
            permits: Semaphore::new(config.crawler.max_connections_per_host as usize),
        })
    }

    /// Creates a client and logs in with the configured credentials
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Self::new(config)?;
        client.login(&config.username, &config.password).await?;
        Ok(client)
    }

    /// The wiki's base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Logs in through the token-based login flow
    ///
    /// # Errors
    ///
    /// * `MirrorError::Authentication` - no login token was issued, the login
    ///   result was not `Success`, or no session cookie was set afterwards
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let token_params = [
            ("action", "query"),
            ("meta", "tokens"),
            ("type", "login"),
            ("format", "json"),
        ];
        let payload = self
            .api_request(self.client.get(self.api_url.clone()).query(&token_params))
            .await?;
        let tokens: TokenQueryResponse = serde_json::from_value(payload)?;
        let login_token = tokens
            .query
            .tokens
            .and_then(|tokens| tokens.logintoken)
            .ok_or_else(|| MirrorError::Authentication("no login token issued".to_string()))?;

        let login_form = [
            ("action", "login"),
            ("format", "json"),
            ("lgname", username),
            ("lgpassword", password),
            ("lgtoken", login_token.as_str()),
        ];
        let payload = self
            .api_request(self.client.post(self.api_url.clone()).form(&login_form))
            .await?;
        let login: LoginResponse = serde_json::from_value(payload)?;

        match login.login.result.as_deref() {
            Some("Success") => {}
            other => {
                return Err(MirrorError::Authentication(
                    login
                        .login
                        .reason
                        .or_else(|| other.map(ToString::to_string))
                        .unwrap_or_else(|| "unknown error".to_string()),
                ))
            }
        }

        if !self.has_session_cookie() {
            return Err(MirrorError::Authentication(
                "no session cookie found".to_string(),
            ));
        }

        tracing::info!("Logged in to {} as {}", self.base_url, username);
        Ok(())
    }

    /// Lazily enumerates the records of a `list=` query across all continuations
    ///
    /// The same query is re-issued, merged with the server's continuation
    /// token, until a response carries no `continue` object. Dropping the stream
    /// early only abandons the request in flight.
    ///
    /// # Errors
    ///
    /// * `MirrorError::MissingParameter` - `params` has no `list` selector
    pub fn list_paginated<'a>(
        &'a self,
        params: &[(&str, &str)],
    ) -> Result<impl Stream<Item = Result<Value>> + 'a> {
        if !params.iter().any(|(key, _)| *key == "list") {
            return Err(MirrorError::MissingParameter("list"));
        }

        let mut query: Vec<(String, String)> = vec![("action".to_string(), "query".to_string())];
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let query = Arc::new(query);

        Ok(stream::try_unfold(Pagination::default(), move |state| {
            self.next_listed(Arc::clone(&query), state)
        }))
    }

    /// Enumerates all pages of a namespace, either only redirects or only content pages
    pub fn list_pages<'a>(
        &'a self,
        namespace: i64,
        redirects: bool,
    ) -> Result<impl Stream<Item = Result<PageListing>> + 'a> {
        let namespace = namespace.to_string();
        let filter = if redirects { "redirects" } else { "nonredirects" };
        let records = self.list_paginated(&[
            ("list", "allpages"),
            ("aplimit", "max"),
            ("apnamespace", namespace.as_str()),
            ("apfilterredir", filter),
        ])?;

        Ok(records.map(|record| {
            record.and_then(|value| Ok(serde_json::from_value::<PageListing>(value)?))
        }))
    }

    /// One-shot lookup returning the first record of the first result group
    ///
    /// # Errors
    ///
    /// * `MirrorError::MissingParameter` - `params` has no `prop` selector
    /// * `MirrorError::MalformedResponse` - the response holds no record
    pub async fn get_property(&self, params: &[(&str, &str)]) -> Result<Value> {
        if !params.iter().any(|(key, _)| *key == "prop") {
            return Err(MirrorError::MissingParameter("prop"));
        }

        let mut query = vec![("action".to_string(), "query".to_string())];
        query.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let mut payload = self.api_get(&query).await?;
        first_result_group(&mut payload)
            .and_then(|records| {
                if records.is_empty() {
                    None
                } else {
                    Some(records.swap_remove(0))
                }
            })
            .ok_or_else(|| MirrorError::MalformedResponse("query returned no records".to_string()))
    }

    /// Fetches the metadata record of a page
    pub async fn page_info(&self, page_id: i64) -> Result<PageInfo> {
        let page_id = page_id.to_string();
        let value = self
            .get_property(&[
                ("prop", "info"),
                ("inprop", "url|displaytitle"),
                ("pageids", page_id.as_str()),
            ])
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the outbound links of a page
    pub async fn page_links(&self, page_id: i64) -> Result<PageLinks> {
        let page_id = page_id.to_string();
        let value = self
            .get_property(&[
                ("prop", "links"),
                ("pllimit", "max"),
                ("pageids", page_id.as_str()),
            ])
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the server-rendered HTML body of a page
    pub async fn get_rendered_page(&self, page_id: i64) -> Result<String> {
        let page_id = page_id.to_string();
        let params = [
            ("action", "render"),
            ("uselang", self.language.as_str()),
            ("safemode", "1"),
            ("curid", page_id.as_str()),
        ];

        let _permit = self.acquire().await?;
        let response = self
            .send(self.client.get(self.index_url.clone()).query(&params), &self.index_url)
            .await?;
        response.text().await.map_err(|source| MirrorError::Http {
            url: self.index_url.to_string(),
            source,
        })
    }

    /// Fetches raw bytes from a path below the wiki base URL
    ///
    /// Used for the stylesheet, the favicon and images.
    pub async fn raw_get(&self, path: &str, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        let _permit = self.acquire().await?;
        let response = self
            .send(self.client.get(url.clone()).query(params), &url)
            .await?;
        let bytes = response.bytes().await.map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Returns true if the cookie store holds a session cookie for the wiki
    fn has_session_cookie(&self) -> bool {
        self.jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().map(str::to_owned).ok())
            .map(|cookies| {
                cookies
                    .split(';')
                    .filter_map(|pair| pair.split('=').next())
                    .any(|name| name.trim().to_ascii_lowercase().contains("session"))
            })
            .unwrap_or(false)
    }

    async fn next_listed(
        &self,
        query: Arc<Vec<(String, String)>>,
        mut state: Pagination,
    ) -> Result<Option<(Value, Pagination)>> {
        loop {
            if let Some(record) = state.buffered.pop_front() {
                return Ok(Some((record, state)));
            }
            if state.exhausted {
                return Ok(None);
            }

            let mut params = query.as_ref().clone();
            if let Some(continuation) = &state.continuation {
                params.extend(
                    continuation
                        .iter()
                        .map(|(key, value)| (key.clone(), param_value(value))),
                );
            }

            let mut payload = self.api_get(&params).await?;
            if let Some(records) = first_result_group(&mut payload) {
                state.buffered.extend(records.drain(..));
            }
            state.continuation = payload.get("continue").and_then(Value::as_object).cloned();
            state.exhausted = state.continuation.is_none();
            tracing::trace!(
                "Listed {} records (more: {})",
                state.buffered.len(),
                !state.exhausted
            );
        }
    }

    /// Authenticated `GET api.php` with the fixed API parameters
    async fn api_get(&self, params: &[(String, String)]) -> Result<Value> {
        let fixed = [
            ("format", "json"),
            ("formatversion", "2"),
            ("assertuser", self.assert_user.as_str()),
        ];
        let request = self
            .client
            .get(self.api_url.clone())
            .query(params)
            .query(&fixed);
        self.api_request(request).await
    }

    async fn api_request(&self, request: RequestBuilder) -> Result<Value> {
        let _permit = self.acquire().await?;
        let response = self.send(request, &self.api_url).await?;
        let payload: Value = response.json().await.map_err(|source| MirrorError::Http {
            url: self.api_url.to_string(),
            source,
        })?;
        check_api_error(&payload)?;
        Ok(payload)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        request
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|source| MirrorError::Http {
                url: url.to_string(),
                source,
            })
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits.acquire().await.map_err(|_| MirrorError::Cancelled)
    }
}

/// Continuation state of a paginated listing
#[derive(Debug, Default)]
struct Pagination {
    buffered: VecDeque<Value>,
    continuation: Option<Map<String, Value>>,
    exhausted: bool,
}

/// Bot-password accounts log in as `User@Bot` but act as `User`
fn assert_user_name(username: &str) -> &str {
    username.split('@').next().unwrap_or(username)
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The record array of the first group under `query`, e.g. `query.allpages`
fn first_result_group(payload: &mut Value) -> Option<&mut Vec<Value>> {
    payload
        .get_mut("query")?
        .as_object_mut()?
        .values_mut()
        .next()?
        .as_array_mut()
}

fn check_api_error(payload: &Value) -> Result<()> {
    if let Some(error) = payload.get("error") {
        let code = error
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        let info = error
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("unknown info");
        return Err(MirrorError::Api {
            code: code.to_string(),
            info: info.to_string(),
        });
    }
    Ok(())
}
