use crate::sdk::ServiceClient;

const ROOT_PATH: &str = "lbaas";
const RESOURCE_PATH: &str = "whitelists";

pub fn root_url(client: &ServiceClient) -> String {
    client.service_url(&[ROOT_PATH, RESOURCE_PATH])
}

pub fn resource_url(client: &ServiceClient, id: &str) -> String {
    client.service_url(&[ROOT_PATH, RESOURCE_PATH, id])
}
