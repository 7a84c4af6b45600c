//! EVS cloud volumes API (`cloudvolumes`).

mod types;

pub use types::{Attachment, DeviceType, Performance, Volume};

use types::VolumeResponse;

use super::{SdkError, ServiceClient};

const RESOURCE_PATH: &str = "cloudvolumes";

pub fn resource_url(client: &ServiceClient, id: &str) -> String {
    client.service_url(&[RESOURCE_PATH, id])
}

pub async fn get(client: &ServiceClient, id: &str) -> Result<Volume, SdkError> {
    let response: VolumeResponse = client.get_json(&resource_url(client, id)).await?;
    Ok(response.volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_url() {
        let client = ServiceClient::new("t", "https://evs.eu-west-0.example.com/v2/proj").unwrap();
        assert_eq!(
            resource_url(&client, "vol-1"),
            "https://evs.eu-west-0.example.com/v2/proj/cloudvolumes/vol-1"
        );
    }
}
