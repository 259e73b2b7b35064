use std::marker::PhantomData;

use resourcekit_meta::{Resource, lifecycle};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ColumnType, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityName, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Schema, TransactionTrait, Value,
};
use time::OffsetDateTime;

use crate::error::ResourceError;
use crate::page::{Filter, LimitCfg, Page};
use crate::stored::StoredResource;
use crate::tx::{self, TxFuture};

/// Generic data access for one resource type.
///
/// Every mutating operation runs its hooks and its store write inside a single transaction,
/// so a failure at any step leaves the persisted record untouched. The `*_in` variants run
/// against a caller-supplied connection or transaction and can be composed through
/// [`Dao::transaction`].
pub struct Dao<R> {
    db: DatabaseConnection,
    limits: LimitCfg,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Dao<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            limits: self.limits,
            _resource: PhantomData,
        }
    }
}

impl<R: StoredResource> Dao<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection, limits: LimitCfg) -> Self {
        Self {
            db,
            limits,
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub fn limits(&self) -> LimitCfg {
        self.limits
    }

    /// Create the resource's table and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns [`ResourceError::Store`] if a DDL statement fails.
    pub async fn auto_migrate(&self) -> Result<(), ResourceError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let entity = R::Entity::default();

        let mut table = schema.create_table_from_entity(entity);
        table.if_not_exists();
        self.db.execute(backend.build(&table)).await?;

        for mut index in schema.create_index_from_entity(entity) {
            index.if_not_exists();
            self.db.execute(backend.build(&index)).await?;
        }

        tracing::info!(kind = R::KIND, table = entity.table_name(), "schema ensured");
        Ok(())
    }

    /// Persist a new resource and return it as stored.
    ///
    /// # Errors
    /// - [`ResourceError::Validation`] if the resource fails validation; nothing is written
    /// - [`ResourceError::Internal`] if a domain hook fails
    /// - [`ResourceError::Store`] on database failure
    pub async fn create(&self, resource: R) -> Result<R, ResourceError> {
        let txn = self.db.begin().await?;
        let result = Self::create_in(&txn, resource).await;
        let created = tx::finish(txn, result).await?;
        tracing::debug!(kind = R::KIND, id = created.metadata().id, "resource created");
        Ok(created)
    }

    /// # Errors
    /// See [`Dao::create`].
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        mut resource: R,
    ) -> Result<R, ResourceError> {
        resource.metadata_mut().clear_server_fields();
        lifecycle::before_create(&mut resource)?;

        let now = OffsetDateTime::now_utc();
        let meta = resource.metadata_mut();
        meta.created_at = Some(now);
        meta.updated_at = Some(now);

        let model = resource.into_active_model().insert(conn).await?;
        R::from_model(model)
    }

    /// # Errors
    /// Returns [`ResourceError::NotFound`] if no record has this id.
    pub async fn get(&self, id: i64) -> Result<R, ResourceError> {
        Self::get_in(&self.db, id).await
    }

    /// # Errors
    /// See [`Dao::get`].
    pub async fn get_in<C: ConnectionTrait>(conn: &C, id: i64) -> Result<R, ResourceError> {
        let model = R::Entity::find()
            .filter(R::id_column().eq(id))
            .one(conn)
            .await?
            .ok_or_else(|| ResourceError::not_found(R::KIND, id))?;
        R::from_model(model)
    }

    /// One page of records in insertion order, optionally narrowed by exact-match filters.
    ///
    /// `page` is 1-based. Out-of-range `page`/`size` values are clamped as described on
    /// [`LimitCfg::clamp`]; the returned [`Page`] reports the values actually used.
    ///
    /// # Errors
    /// - [`ResourceError::InvalidFilter`] for an unknown field or an uncoercible value
    /// - [`ResourceError::Store`] on database failure
    pub async fn list(
        &self,
        page: i64,
        size: i64,
        filter: Option<&Filter>,
    ) -> Result<Page<R>, ResourceError> {
        self.list_in(&self.db, page, size, filter).await
    }

    /// # Errors
    /// See [`Dao::list`].
    pub async fn list_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        page: i64,
        size: i64,
        filter: Option<&Filter>,
    ) -> Result<Page<R>, ResourceError> {
        let (page, size) = self.limits.clamp(page, size);
        let select = R::Entity::find().filter(filter_condition::<R>(filter)?);

        let total = select.clone().count(conn).await?;

        // Pages past the data are empty; this also keeps huge offsets away from the driver.
        let Some(offset) = (page - 1).checked_mul(size).filter(|offset| *offset < total) else {
            return Ok(Page {
                items: Vec::new(),
                total,
                page,
                size,
            });
        };

        let models = select
            .order_by_asc(R::id_column())
            .offset(offset)
            .limit(size)
            .all(conn)
            .await?;

        let items = models
            .into_iter()
            .map(R::from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            page,
            size,
        })
    }

    /// Replace the record with `resource`.
    ///
    /// Server-managed metadata is taken from the persisted record, so ids, versions and
    /// timestamps in `resource` are ignored.
    ///
    /// # Errors
    /// - [`ResourceError::NotFound`] if no record has this id
    /// - [`ResourceError::Validation`] if the replacement fails validation
    /// - [`ResourceError::Store`] on database failure
    pub async fn update(&self, id: i64, resource: R) -> Result<R, ResourceError> {
        self.update_with(id, move |_| Ok(resource)).await
    }

    /// Replace the record with the value computed by `f` from the persisted one.
    ///
    /// `f` runs inside the update transaction.
    ///
    /// # Errors
    /// See [`Dao::update`]; errors returned by `f` are propagated unchanged.
    pub async fn update_with<F>(&self, id: i64, f: F) -> Result<R, ResourceError>
    where
        F: FnOnce(R) -> Result<R, ResourceError> + Send,
    {
        let txn = self.db.begin().await?;
        let result = Self::update_in(&txn, id, f).await;
        let updated = tx::finish(txn, result).await?;
        tracing::debug!(
            kind = R::KIND,
            id,
            version = updated.metadata().resource_version,
            "resource updated"
        );
        Ok(updated)
    }

    /// Should run inside a transaction: the record is read, then written.
    ///
    /// # Errors
    /// See [`Dao::update_with`].
    pub async fn update_in<C, F>(conn: &C, id: i64, f: F) -> Result<R, ResourceError>
    where
        C: ConnectionTrait,
        F: FnOnce(R) -> Result<R, ResourceError> + Send,
    {
        let persisted = Self::get_in(conn, id).await?;

        let mut next = f(persisted.clone())?;
        next.metadata_mut().carry_server_fields(persisted.metadata());
        next.carry_over(&persisted);
        lifecycle::before_update(&mut next)?;
        next.metadata_mut().updated_at = Some(OffsetDateTime::now_utc());

        let mut active = next.into_active_model();
        active.not_set(R::id_column());

        let res = R::Entity::update_many()
            .set(active)
            .filter(R::id_column().eq(id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(ResourceError::not_found(R::KIND, id));
        }

        Self::get_in(conn, id).await
    }

    /// Remove the record and return its final state, as left by the delete hooks.
    ///
    /// # Errors
    /// - [`ResourceError::NotFound`] if no record has this id
    /// - [`ResourceError::Store`] on database failure
    pub async fn delete(&self, id: i64) -> Result<R, ResourceError> {
        let txn = self.db.begin().await?;
        let result = Self::delete_in(&txn, id).await;
        let deleted = tx::finish(txn, result).await?;
        tracing::debug!(kind = R::KIND, id, "resource deleted");
        Ok(deleted)
    }

    /// # Errors
    /// See [`Dao::delete`].
    pub async fn delete_in<C: ConnectionTrait>(conn: &C, id: i64) -> Result<R, ResourceError> {
        let mut current = Self::get_in(conn, id).await?;
        lifecycle::before_delete(&mut current)?;

        let res = R::Entity::delete_many()
            .filter(R::id_column().eq(id))
            .exec(conn)
            .await?;
        if res.rows_affected == 0 {
            return Err(ResourceError::not_found(R::KIND, id));
        }

        Ok(current)
    }

    /// Run `f` atomically on this resource's database.
    ///
    /// ```ignore
    /// let (a, b) = dao
    ///     .transaction(|tx| {
    ///         Box::pin(async move {
    ///             let a = Dao::<Widget>::create_in(tx, first).await?;
    ///             let b = Dao::<Widget>::create_in(tx, second).await?;
    ///             Ok::<_, ResourceError>((a, b))
    ///         })
    ///     })
    ///     .await?;
    /// ```
    ///
    /// # Errors
    /// Returns the error of `f` after rolling back, or a store error if the transaction
    /// cannot be opened or committed.
    pub async fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T, E> + Send,
        T: Send,
        E: From<DbErr> + Send,
    {
        tx::with_transaction(&self.db, f).await
    }
}

fn filter_condition<R: StoredResource>(
    filter: Option<&Filter>,
) -> Result<Condition, ResourceError> {
    let mut cond = Condition::all();
    for (field, raw) in filter.into_iter().flatten() {
        let column = R::filter_column(field)
            .ok_or_else(|| ResourceError::invalid_filter(field.as_str(), "unknown field"))?;
        let value = coerce(field, column.def().get_column_type(), raw)?;
        cond = cond.add(column.eq(value));
    }
    Ok(cond)
}

fn coerce(field: &str, ty: &ColumnType, raw: &str) -> Result<Value, ResourceError> {
    match ty {
        ColumnType::Boolean => raw
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| ResourceError::invalid_filter(field, "expected true or false")),
        ColumnType::TinyInteger
        | ColumnType::SmallInteger
        | ColumnType::Integer
        | ColumnType::BigInteger => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ResourceError::invalid_filter(field, "expected an integer")),
        _ => Ok(Value::from(raw.to_owned())),
    }
}
