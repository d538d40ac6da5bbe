use core::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt as _};
use logging::debug_with_head;
use reqwest::{header::ACCEPT, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use types::{
    api::{ProposerDuty, ValidatorRecord},
    combined::SignedBeaconBlock,
    nonstandard::Phase,
    primitives::{Epoch, Slot, H256},
};
use url::Url;

use crate::{
    config::{DEFAULT_REQUEST_TIMEOUT, MAX_IDLE_CONNECTIONS_PER_HOST},
    error::{Error, Missing, ParseError, Result},
    remote::RemoteChainSource,
    sse::{self, ServerSentEvent},
};

const TEXT_EVENT_STREAM: &str = "text/event-stream";

#[derive(Deserialize)]
struct EthResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct VersionedResponse {
    version: String,
    data: Value,
}

#[derive(Deserialize)]
struct RandaoResponse {
    randao: H256,
}

pub fn build_http_client() -> Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
        .build()
        .map_err(Into::into)
}

/// [`RemoteChainSource`] backed by the standard Beacon Node HTTP API.
pub struct BeaconNodeApi {
    url: Url,
    client: Client,
    request_timeout: Duration,
}

impl BeaconNodeApi {
    #[must_use]
    pub const fn new(url: Url, client: Client, request_timeout: Duration) -> Self {
        Self {
            url,
            client,
            request_timeout,
        }
    }

    pub fn with_default_client(url: Url) -> Result<Self> {
        Ok(Self::new(url, build_http_client()?, DEFAULT_REQUEST_TIMEOUT))
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.url.join(path).map_err(Into::into)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;

        debug_with_head!("GET {url}");

        Ok(self.client.get(url).timeout(self.request_timeout))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path)?.send().await?;
        let response = handle_error(response).await?;
        let EthResponse { data } = response.json().await?;
        Ok(data)
    }
}

#[async_trait]
impl RemoteChainSource for BeaconNodeApi {
    async fn proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>> {
        let response = self
            .get(&format!("/eth/v1/validator/duties/proposer/{epoch}"))?
            .send()
            .await?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Err(Error::Syncing { epoch });
        }

        let response = handle_error(response).await?;
        let EthResponse { data } = response.json().await?;

        Ok(data)
    }

    async fn block(&self, slot: Slot) -> Result<Option<SignedBeaconBlock>> {
        let response = self
            .get(&format!("/eth/v2/beacon/blocks/{slot}"))?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug_with_head!("no block at slot {slot}");
            return Ok(None);
        }

        let response = handle_error(response).await?;
        let VersionedResponse { version, data } = response.json().await?;

        let phase = version
            .parse::<Phase>()
            .map_err(|_| ParseError::UnsupportedVersion { version })?;

        let block = SignedBeaconBlock::deserialize_for_phase(phase, data)
            .map_err(|source| ParseError::Json { phase, source })?;

        Ok(Some(block))
    }

    async fn validators(&self) -> Result<Vec<ValidatorRecord>> {
        let response = self
            .get("/eth/v1/beacon/states/head/validators")?
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::not_found(Missing::Validators));
        }

        let response = handle_error(response).await?;
        let EthResponse { data } = response.json().await?;

        Ok(data)
    }

    async fn randao(&self, slot: Slot) -> Result<H256> {
        let RandaoResponse { randao } = self
            .get_data(&format!("/eth/v1/beacon/states/{slot}/randao"))
            .await?;

        Ok(randao)
    }

    async fn head_events(&self) -> Result<BoxStream<'static, Result<ServerSentEvent>>> {
        let mut url = self.endpoint("/eth/v1/events")?;
        url.query_pairs_mut().append_pair("topics", "head");

        debug_with_head!("subscribing to {url}");

        // No timeout here. The subscription stays open for as long as the node keeps it open.
        let response = self
            .client
            .get(url)
            .header(ACCEPT, TEXT_EVENT_STREAM)
            .send()
            .await?;

        let response = handle_error(response).await?;

        Ok(sse::server_sent_events(response.bytes_stream()).boxed())
    }
}

async fn handle_error(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;

    Err(Error::UnexpectedStatus { status, body })
}
