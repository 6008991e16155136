use reqwest::Client;
use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::models::{ChatResponse, Message};
use crate::provider::Provider;

pub async fn call_provider(
    client: &Client,
    upstream: &UpstreamConfig,
    provider: Provider,
    api_key: &str,
    messages: &[Message]
) -> Result<ChatResponse, GatewayError> {

    let transport = |source| GatewayError::Transport { provider, source };

    // build the vendor specific body and headers
    let payload = provider.build_request(messages);
    let request = client
        .post(provider.endpoint(upstream))
        .timeout(upstream.timeout)
        .json(&payload);

    let response = provider
        .authorize(request, api_key)
        .send()
        .await
        .map_err(transport)?;

    // read the whole body first, vendors put their error message in it
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(transport)?;

    if !status.is_success() {
        return Err(provider.upstream_error(status, &body));
    }

    provider.parse_response(&body)

}
