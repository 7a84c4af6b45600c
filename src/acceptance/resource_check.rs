use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::check::{BoxedCheck, Check, CheckContext};
use super::{CheckError, FetchError};
use crate::config::Config;
use crate::resource::{AddressError, ResourceAddress};
use crate::terraform::InstanceState;

/// Retrieves the live cloud object behind a state instance.
#[async_trait]
pub trait ResourceFetcher: Send + Sync + 'static {
    type Object: Send + 'static;

    async fn fetch(&self, config: &Config, state: &InstanceState) -> Result<Self::Object, FetchError>;
}

/// Existence and destruction checks for one resource address.
///
/// The last object fetched by an existence check is kept and can be read
/// back with [`ResourceCheck::object`] once the step has run.
pub struct ResourceCheck<F: ResourceFetcher> {
    address: ResourceAddress,
    fetcher: Arc<F>,
    holder: Arc<Mutex<Option<F::Object>>>,
}

impl<F: ResourceFetcher> Clone for ResourceCheck<F> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            fetcher: Arc::clone(&self.fetcher),
            holder: Arc::clone(&self.holder),
        }
    }
}

impl<F: ResourceFetcher> ResourceCheck<F> {
    pub fn new(address: &str, fetcher: F) -> Result<Self, AddressError> {
        Ok(Self::for_address(ResourceAddress::parse(address)?, fetcher))
    }

    pub fn for_address(address: ResourceAddress, fetcher: F) -> Self {
        Self {
            address,
            fetcher: Arc::new(fetcher),
            holder: Arc::new(Mutex::new(None)),
        }
    }

    pub fn address(&self) -> &ResourceAddress {
        &self.address
    }

    pub fn object(&self) -> Option<F::Object>
    where
        F::Object: Clone,
    {
        self.holder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn check_resource_exists(&self) -> BoxedCheck {
        Box::new(Exists {
            rc: self.clone(),
            count: None,
        })
    }

    /// Checks `address.0` through `address.(count - 1)`.
    pub fn check_multi_resources_exists(&self, count: u64) -> BoxedCheck {
        Box::new(Exists {
            rc: self.clone(),
            count: Some(count),
        })
    }

    pub fn check_resource_destroy(&self) -> BoxedCheck {
        Box::new(Destroyed { rc: self.clone() })
    }

    async fn fetch_existing(&self, ctx: &CheckContext<'_>, address: &str) -> Result<(), CheckError> {
        let instance = ctx.instance(address)?;
        if instance.id.is_empty() {
            return Err(CheckError::MissingId {
                address: address.to_string(),
            });
        }

        let object = self
            .fetcher
            .fetch(ctx.config, instance)
            .await
            .map_err(|source| CheckError::Fetch {
                address: address.to_string(),
                source,
            })?;

        tracing::debug!(%address, id = %instance.id, "resource exists");
        *self.holder.lock().unwrap_or_else(PoisonError::into_inner) = Some(object);
        Ok(())
    }
}

struct Exists<F: ResourceFetcher> {
    rc: ResourceCheck<F>,
    count: Option<u64>,
}

#[async_trait]
impl<F: ResourceFetcher> Check for Exists<F> {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        match self.count {
            None => self.rc.fetch_existing(ctx, &self.rc.address.to_string()).await,
            Some(count) => {
                for i in 0..count {
                    let address = self.rc.address.with_index(i).to_string();
                    self.rc.fetch_existing(ctx, &address).await?;
                }
                Ok(())
            }
        }
    }
}

struct Destroyed<F: ResourceFetcher> {
    rc: ResourceCheck<F>,
}

#[async_trait]
impl<F: ResourceFetcher> Check for Destroyed<F> {
    async fn check(&self, ctx: &CheckContext<'_>) -> Result<(), CheckError> {
        let resource_type = &self.rc.address.resource_type;

        for (address, instance) in ctx.state.managed_of_type(resource_type) {
            if instance.id.is_empty() {
                continue;
            }

            match self.rc.fetcher.fetch(ctx.config, instance).await {
                Ok(_) => {
                    return Err(CheckError::StillExists {
                        resource_type: resource_type.clone(),
                        id: instance.id.clone(),
                    });
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(%address, id = %instance.id, "resource destroyed");
                }
                Err(source) => {
                    return Err(CheckError::DestroyFetch {
                        resource_type: resource_type.clone(),
                        id: instance.id.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}
