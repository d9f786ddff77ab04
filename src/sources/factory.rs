use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::debug;

use crate::evm::{self, ContractField, ContractReader};
use crate::model::SourceId;

use super::onchain::read_vault_fields;
use super::{AdapterError, PartialMembership, SourceAdapter};

/// Vaults the user deployed through the factory.
///
/// The creator list is the one authoritative read; if it fails the whole
/// adapter fails. Metadata for each vault is read concurrently and best
/// effort.
pub struct FactoryAdminAdapter {
    reader: Arc<dyn ContractReader>,
    factory: Address,
}

impl FactoryAdminAdapter {
    pub fn new(reader: Arc<dyn ContractReader>, factory: Address) -> Self {
        FactoryAdminAdapter { reader, factory }
    }
}

#[async_trait]
impl SourceAdapter for FactoryAdminAdapter {
    fn id(&self) -> SourceId {
        SourceId::FactoryAdmin
    }

    async fn fetch(&self, user: Address) -> Result<Vec<PartialMembership>, AdapterError> {
        let mut vaults = evm::read_addresses(
            self.reader.as_ref(),
            self.factory,
            ContractField::VaultsByCreator(user),
        )
        .await?;
        vaults.sort();
        vaults.dedup();
        debug!(count = vaults.len(), "factory listed vaults");

        let reader = self.reader.as_ref();
        let records = join_all(vaults.into_iter().map(|vault| async move {
            let mut fields = read_vault_fields(reader, vault).await;
            // The factory vouches for the creator when owner() is unreadable.
            fields.owner_address = fields.owner_address.or(Some(user));
            PartialMembership {
                vault: Some(vault),
                fields,
                ..Default::default()
            }
        }))
        .await;

        Ok(records)
    }
}
