//! Load-balancer whitelist API (`lbaas/whitelists`).

mod types;
mod urls;

pub use types::{CreateOpts, ListOpts, UpdateOpts, Whitelist};
pub use urls::{resource_url, root_url};

use types::{CreateRequest, UpdateRequest, WhitelistResponse, WhitelistsResponse};

use super::{SdkError, ServiceClient};

pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<Whitelist, SdkError> {
    let response: WhitelistResponse = client
        .post_json(&root_url(client), &CreateRequest { whitelist: opts })
        .await?;
    Ok(response.whitelist)
}

pub async fn get(client: &ServiceClient, id: &str) -> Result<Whitelist, SdkError> {
    let response: WhitelistResponse = client.get_json(&resource_url(client, id)).await?;
    Ok(response.whitelist)
}

pub async fn update(
    client: &ServiceClient,
    id: &str,
    opts: &UpdateOpts,
) -> Result<Whitelist, SdkError> {
    let response: WhitelistResponse = client
        .put_json(&resource_url(client, id), &UpdateRequest { whitelist: opts })
        .await?;
    Ok(response.whitelist)
}

pub async fn delete(client: &ServiceClient, id: &str) -> Result<(), SdkError> {
    client.delete(&resource_url(client, id)).await
}

pub async fn list(client: &ServiceClient, opts: &ListOpts) -> Result<Vec<Whitelist>, SdkError> {
    let url = format!("{}{}", root_url(client), opts.to_query());
    let response: WhitelistsResponse = client.get_json(&url).await?;
    Ok(response.whitelists)
}
