use std::{
    borrow::Cow,
    fmt::{Formatter, Write},
};

use serde::de::DeserializeOwned;

pub mod auth;
pub mod content;
pub mod course;
pub mod election;

#[async_trait::async_trait]
pub trait Request {
    type Output;

    const URL_SUFFIX: &'static str;
    const METHOD: reqwest::Method = reqwest::Method::POST;

    /// Path of the request, [`Self::URL_SUFFIX`] unless it carries parameters.
    fn url_suffix(&self) -> Cow<'static, str> {
        Cow::Borrowed(Self::URL_SUFFIX)
    }

    fn make_req(&self, req: reqwest::RequestBuilder) -> anyhow::Result<reqwest::RequestBuilder> {
        Ok(req)
    }

    async fn parse_res(&mut self, response: reqwest::Response) -> anyhow::Result<Self::Output>;
}

/// A non-2xx response.
#[derive(Debug)]
pub struct ResponseError {
    pub status_code: reqwest::StatusCode,
    /// The `error` field of the body, if any.
    pub error: Option<String>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_code.as_str())?;

        if let Some(msg) = self.status_code.canonical_reason() {
            f.write_char(' ')?;
            f.write_str(msg)?;
        }

        if let Some(ref msg) = self.error {
            f.write_str(": ")?;
            f.write_str(msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ResponseError {}

/// Calls a [`Request`] and return its output.
pub async fn call<T: Request>(
    mut req: T,
    cx: &crate::Context,
) -> anyhow::Result<<T as Request>::Output> {
    let mut builder = cx
        .req_client
        .request(T::METHOD, format!("{}{}", cx.url_prefix, req.url_suffix()));
    if let Some(token) = cx.token() {
        builder = builder.bearer_auth(token);
    }
    let response = req.make_req(builder)?.send().await?;
    let status = response.status();

    if !status.is_success() {
        let err_msg = response
            .json::<portal_shared::ErrorInfo>()
            .await
            .ok()
            .map(|info| info.error);

        return Err(anyhow::Error::new(ResponseError {
            status_code: status,
            error: err_msg,
        }));
    }

    req.parse_res(response).await
}

/// Parses a JSON response body.
#[inline]
async fn json<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    Ok(response.json().await?)
}

/// Implements [`Request`] for a request type.
///
/// `$req` is bound to the request inside the path and body expressions.
macro_rules! request {
    (
        $t:ty => $out:ty, $method:ident $suffix:literal
        $(, path($req:ident) = $path:expr)?
        $(, json($jreq:ident) = $body:expr)?
        $(, query($qreq:ident) = $query:expr)?
    ) => {
        #[async_trait::async_trait]
        impl $crate::raw::Request for $t {
            type Output = $out;
            const URL_SUFFIX: &'static str = $suffix;
            const METHOD: reqwest::Method = reqwest::Method::$method;

            $(
                fn url_suffix(&self) -> std::borrow::Cow<'static, str> {
                    let $req = self;
                    std::borrow::Cow::Owned($path)
                }
            )?

            fn make_req(
                &self,
                req: reqwest::RequestBuilder,
            ) -> anyhow::Result<reqwest::RequestBuilder> {
                $(let $jreq = self; let req = req.json($body);)?
                $(let $qreq = self; let req = req.query($query);)?
                Ok(req)
            }

            async fn parse_res(
                &mut self,
                response: reqwest::Response,
            ) -> anyhow::Result<Self::Output> {
                $crate::raw::json(response).await
            }
        }
    };
}

pub(crate) use request;
