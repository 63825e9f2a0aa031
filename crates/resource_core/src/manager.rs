//! Generic resource manager.
//!
//! # Responsibility
//! - Expose create/get/update/delete/list for one resource type.
//! - Parse identifiers, run the lifecycle hook and translate store failures.
//!
//! # Invariants
//! - Malformed id text fails with `InvalidFormat` before any store call.
//! - The manager never builds filter predicates; list queries come only from
//!   the injected `ListQueryBuilder`.
//! - Delete confirms existence through `get` and returns its error unchanged.
//! - No retries, no caching, no state beyond injected collaborators.

use crate::db::DbError;
use crate::error::{translate_store_error, ResourceError, ResourceResult};
use crate::id::RecordId;
use crate::model::{Patch, Resource};
use crate::query::ListQueryBuilder;
use crate::store::StoreClient;
use log::{debug, warn};
use std::marker::PhantomData;

/// Create/Get/Update/Delete/List over a store client for resource `R`.
///
/// Concrete managers hold one of these and delegate to it.
pub struct ResourceManager<R, S, B> {
    store: S,
    list_query: B,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, B> ResourceManager<R, S, B>
where
    R: Resource,
    S: StoreClient,
    B: ListQueryBuilder,
{
    pub fn new(store: S, list_query: B) -> Self {
        Self {
            store,
            list_query,
            _resource: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_query_builder(&self) -> &B {
        &self.list_query
    }

    /// Creates a record from `data`.
    ///
    /// # Contract
    /// - Starts from `R::default()`, copies `data`, then runs the lifecycle hook.
    /// - Returns the persisted instance with its id populated.
    pub fn create<P: Patch<R> + ?Sized>(&self, data: &P) -> ResourceResult<R> {
        let mut item = R::default();
        data.copy_into(&mut item);
        item.before_create();

        self.store
            .insert(&item)
            .map_err(|err| self.store_failure("create", &err))?;

        debug!(
            "event=resource_create module=manager status=ok table={} id={}",
            R::TABLE,
            item.envelope().id
        );
        Ok(item)
    }

    /// Loads one record by id text.
    pub fn get(&self, id: &str) -> ResourceResult<R> {
        let id = self.parse_id("get", id)?;

        let item = self
            .store
            .find_by_id::<R>(&id.to_binary())
            .map_err(|err| self.store_failure("get", &err))?;

        debug!(
            "event=resource_get module=manager status=ok table={} id={}",
            R::TABLE,
            id
        );
        Ok(item)
    }

    /// Writes the columns `data` carries to the record with `id`.
    ///
    /// # Contract
    /// - Only columns reported by `Patch::present_columns` are written.
    /// - An id matching no row is not an error.
    /// - The updated record is not re-fetched.
    pub fn update<P: Patch<R> + ?Sized>(&self, id: &str, data: &P) -> ResourceResult<()> {
        let id = self.parse_id("update", id)?;

        let mut item = R::default();
        data.copy_into(&mut item);
        let present = data.present_columns();
        let assignments = item
            .column_values()
            .into_iter()
            .filter(|(column, _)| present.contains(column))
            .collect::<Vec<_>>();

        let changed = self
            .store
            .update_by_id::<R>(&id.to_binary(), &assignments)
            .map_err(|err| self.store_failure("update", &err))?;

        debug!(
            "event=resource_update module=manager status=ok table={} id={} columns={} rows={}",
            R::TABLE,
            id,
            assignments.len(),
            changed
        );
        Ok(())
    }

    /// Deletes the record with `id`.
    ///
    /// Fails with exactly the error [`Self::get`] would return when the
    /// record cannot be resolved, without issuing a delete.
    pub fn delete(&self, id: &str) -> ResourceResult<()> {
        let item = self.get(id)?;

        self.store
            .delete(&item)
            .map_err(|err| self.store_failure("delete", &err))?;

        debug!(
            "event=resource_delete module=manager status=ok table={} id={}",
            R::TABLE,
            item.envelope().id
        );
        Ok(())
    }

    /// Lists records matching `params`, in store order.
    ///
    /// A builder failure returns `Internal` without reaching the store.
    pub fn list(&self, params: &B::Params) -> ResourceResult<Vec<R>> {
        let query = self.list_query.build_query(params).map_err(|err| {
            warn!(
                "event=resource_list module=manager status=error table={} error_code={} error={}",
                R::TABLE,
                ResourceError::Internal.code(),
                err
            );
            ResourceError::Internal
        })?;

        let items = self
            .store
            .find_all::<R>(&query)
            .map_err(|err| self.store_failure("list", &err))?;

        debug!(
            "event=resource_list module=manager status=ok table={} rows={}",
            R::TABLE,
            items.len()
        );
        Ok(items)
    }

    fn parse_id(&self, operation: &str, text: &str) -> ResourceResult<RecordId> {
        RecordId::parse(text).map_err(|_| {
            debug!(
                "event=resource_{} module=manager status=error table={} error_code={}",
                operation,
                R::TABLE,
                ResourceError::InvalidFormat.code()
            );
            ResourceError::InvalidFormat
        })
    }

    fn store_failure(&self, operation: &str, err: &DbError) -> ResourceError {
        let translated = translate_store_error(err);
        debug!(
            "event=resource_{} module=manager status=error table={} error_code={}",
            operation,
            R::TABLE,
            translated.code()
        );
        translated
    }
}
