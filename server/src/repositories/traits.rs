//! Generic repository traits
//!
//! Each repository implements only the operations its resource needs.

/// Inserts a new row and returns it with the id assigned by the database
///
/// # Type Parameters
/// * `Entity` - Row type returned after the insert
/// * `CreateDTO` - Insert payload (no id)
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Reads a single row by primary key
///
/// # Returns
/// * `Ok(Some(Entity))` - Row found
/// * `Ok(None)` - No row with that id
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Reads every row whose primary key is in `ids`
///
/// Rows come back in database order, not in the order of `ids`. An empty
/// slice yields an empty vector without touching the database.
pub trait ReadMany<Entity, Id> {
    async fn read_many(&self, ids: &[Id]) -> Result<Vec<Entity>, sqlx::Error>;
}

/// Partial update: only `Some(_)` fields of the DTO are written
///
/// # Returns
/// * `Ok(Entity)` - Row after the update
/// * `Err(sqlx::Error::RowNotFound)` - No row with that id
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Deletes a row by primary key
///
/// # Returns
/// * `Ok(true)` - A row was deleted
/// * `Ok(false)` - Nothing matched
pub trait Delete<Id> {
    async fn delete(&self, id: &Id) -> Result<bool, sqlx::Error>;
}
