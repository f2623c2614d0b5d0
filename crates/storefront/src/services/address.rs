//! Address slot operations.

use std::sync::Arc;

use tracing::instrument;

use cartline_core::{AddressSlot, UserId};

use super::{ServiceError, to_document};
use crate::db::{AppendOutcome, ArrayField, DocumentStore, RepositoryError};
use crate::models::{Address, AddressInput};

/// Address service.
///
/// A user has at most [`AddressSlot::CAPACITY`] addresses. The first one
/// added is the home slot, the second the work slot.
#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn DocumentStore>,
}

impl AddressService {
    /// Create a new address service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Add an address to the next free slot.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if a field is blank.
    /// Returns `ServiceError::LimitExceeded` if both slots are taken; nothing
    /// is written in that case.
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self, input), fields(%user_id))]
    pub async fn add(&self, user_id: UserId, input: AddressInput) -> Result<Address, ServiceError> {
        validate(&input)?;

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        if user.addresses.len() >= AddressSlot::CAPACITY {
            tracing::info!(count = user.addresses.len(), "Address limit reached");
            return Err(ServiceError::LimitExceeded);
        }

        let address = input.into_address();
        // The bound is re-checked inside the write so racing adds cannot
        // push the list past capacity.
        let outcome = self
            .store
            .append_to_array(
                user_id,
                ArrayField::Addresses,
                to_document(&address)?,
                Some(AddressSlot::CAPACITY),
            )
            .await
            .map_err(ServiceError::user_scoped)?;

        match outcome {
            AppendOutcome::Appended => {
                tracing::info!(address_id = %address.id, "Added address");
                Ok(address)
            }
            AppendOutcome::Full => Err(ServiceError::LimitExceeded),
        }
    }

    /// Overwrite the four fields of an existing slot, keeping its identity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if a field is blank.
    /// Returns `ServiceError::NotFound` if the user does not exist or has no
    /// address in `slot`. A missing slot is never created.
    #[instrument(skip(self, input), fields(%user_id, %slot))]
    pub async fn edit(
        &self,
        user_id: UserId,
        slot: AddressSlot,
        input: AddressInput,
    ) -> Result<(), ServiceError> {
        validate(&input)?;

        if self.store.get_user(user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user"));
        }

        self.store
            .set_array_element_at(user_id, ArrayField::Addresses, slot.index(), input.to_fields())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::NotFound("address slot"),
                other => ServiceError::Store(other),
            })?;

        tracing::info!("Updated address");
        Ok(())
    }

    /// Remove all addresses, whatever their number.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(%user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.store
            .overwrite_array(user_id, ArrayField::Addresses, Vec::new())
            .await
            .map_err(ServiceError::user_scoped)?;

        tracing::info!("Cleared addresses");
        Ok(())
    }
}

fn validate(input: &AddressInput) -> Result<(), ServiceError> {
    match input.first_blank_field() {
        Some(field) => Err(ServiceError::Validation(format!("{field} must not be empty"))),
        None => Ok(()),
    }
}
