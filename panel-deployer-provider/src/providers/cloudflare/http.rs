//! Cloudflare HTTP request methods

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CloudflareClient, CloudflareResponse};

impl CloudflareClient {
    /// GET and unwrap the `result` field.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        self.send::<T, ()>(Method::GET, path, None, context).await
    }

    /// POST a JSON body and unwrap the `result` field.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        self.send(Method::POST, path, Some(body), context).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.credentials.apply(self.client.request(method.clone(), &url));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let (_status, response_text) = HttpUtils::execute_request_with_retry(
            builder,
            self.provider_name(),
            method.as_str(),
            &url,
            self.max_retries,
        )
        .await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&response_text, self.provider_name())?;

        if !cf_response.success {
            let raw = cf_response
                .errors
                .and_then(|errors| {
                    errors
                        .into_iter()
                        .next()
                        .map(|e| RawApiError::with_code(e.code.to_string(), e.message))
                })
                .unwrap_or_else(|| RawApiError::new("Unknown error"));
            log::error!("[cloudflare] API error: {}", raw.message);
            return Err(self.map_error(raw, context));
        }

        cf_response
            .result
            .ok_or_else(|| self.parse_error("response is missing the result field"))
    }
}
