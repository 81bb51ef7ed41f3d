//! MongoDB store: session setup plus [`DocumentStore`] and [`BlobStore`].

use std::fmt;

use ::mongodb::gridfs::{FilesCollectionDocument, GridFsBucket};
use ::mongodb::options::{ClientOptions, GridFsBucketOptions};
use ::mongodb::{Client, Collection, Database};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use futures::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::errors::{
    BACKEND_NAME, blob_error, connect_error, insert_error, is_file_not_found, operation_error,
    stream_error,
};
use crate::config::StoreConfig;
use crate::core::{
    BackendKind, BlobId, BlobMeta, BlobStore, DocumentStore, InsertAck, Store, WriteAck,
};
use crate::error::{StoreOperation, StoreResult};
use crate::record::Record;
use crate::record::codec::NAME_KEY;
use crate::resolve::{HostResolver, resolve_ipv4};

const APP_NAME: &str = "strongbox";

/// A session against one MongoDB database, holding the record collection
/// and the blob bucket used by the probe.
///
/// The handles are cheap to clone and shared across every operation of a
/// probe run.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<Document>,
    bucket: GridFsBucket,
}

impl fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .field("collection", &self.collection.name())
            .finish_non_exhaustive()
    }
}

impl MongoStore {
    /// Opens a session described by `config`.
    ///
    /// When [`StoreConfig::resolve_ipv4`] is set, the host is first resolved
    /// through `resolver` and the connection goes to its first IPv4 address.
    /// The session is verified with a `ping` on the target database, so
    /// unreachable servers and rejected credentials surface here rather than
    /// on the first operation.
    ///
    /// # Errors
    ///
    /// * `StoreError::Resolution` - If the host has no IPv4 address
    /// * `StoreError::Connection` - If the descriptor is malformed, the server
    ///   is unreachable, or authentication is rejected
    pub async fn connect(config: &StoreConfig, resolver: &dyn HostResolver) -> StoreResult<Self> {
        config.validate()?;

        let host = if config.resolve_ipv4 {
            resolve_ipv4(resolver, &config.host, config.port)
                .await?
                .to_string()
        } else {
            config.host.clone()
        };

        info!(
            uri = %config.redacted_connection_string(&host),
            database = %config.database,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(config.connection_string(&host))
            .await
            .map_err(connect_error)?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.server_selection_timeout);

        let client = Client::with_options(options).map_err(connect_error)?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connect_error)?;
        info!("Got client");

        let collection = database.collection::<Document>(&config.collection);
        let bucket = database.gridfs_bucket(
            GridFsBucketOptions::builder()
                .bucket_name(config.bucket.clone())
                .build(),
        );

        Ok(Self {
            client,
            database,
            collection,
            bucket,
        })
    }

    /// Returns the underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn blob_id_to_bson(id: &BlobId) -> Bson {
    match ObjectId::parse_str(id.as_str()) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.as_str().to_string()),
    }
}

fn blob_id_from_bson(id: &Bson) -> BlobId {
    match id {
        Bson::ObjectId(oid) => BlobId::new(oid.to_hex()),
        Bson::String(s) => BlobId::new(s.clone()),
        other => BlobId::new(other.to_string()),
    }
}

fn blob_meta(file: FilesCollectionDocument) -> BlobMeta {
    BlobMeta {
        id: blob_id_from_bson(&file.id),
        filename: file.filename.unwrap_or_default(),
        length: file.length,
        uploaded_at: file.upload_date.to_chrono(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, record: &Record) -> StoreResult<InsertAck> {
        let result = self
            .collection
            .insert_one(record.to_document())
            .await
            .map_err(|e| insert_error(&record.name, e))?;

        let inserted_id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        debug!(name = %record.name, id = %inserted_id, "Inserted record");

        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn replace_by_name(&self, name: &str, record: &Record) -> StoreResult<WriteAck> {
        let result = self
            .collection
            .replace_one(doc! { NAME_KEY: name }, record.to_document())
            .await
            .map_err(|e| operation_error(StoreOperation::Replace, e))?;
        debug!(
            name = %name,
            matched = result.matched_count,
            modified = result.modified_count,
            "Replaced record"
        );

        Ok(WriteAck::acknowledged(result.matched_count > 0))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Record>> {
        let found = self
            .collection
            .find_one(doc! { NAME_KEY: name })
            .await
            .map_err(|e| operation_error(StoreOperation::Find, e))?;

        match found {
            Some(document) => Ok(Some(Record::from_document(&document)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_name(&self, name: &str) -> StoreResult<WriteAck> {
        let result = self
            .collection
            .delete_one(doc! { NAME_KEY: name })
            .await
            .map_err(|e| operation_error(StoreOperation::Delete, e))?;
        debug!(name = %name, deleted = result.deleted_count, "Deleted record");

        Ok(WriteAck::acknowledged(result.deleted_count > 0))
    }
}

#[async_trait]
impl BlobStore for MongoStore {
    async fn upload_blob(&self, filename: &str, bytes: Vec<u8>) -> StoreResult<BlobId> {
        let mut stream = self
            .bucket
            .open_upload_stream(filename)
            .await
            .map_err(|e| operation_error(StoreOperation::UploadBlob, e))?;
        stream
            .write_all(&bytes)
            .await
            .map_err(|e| stream_error(StoreOperation::UploadBlob, e))?;
        stream
            .close()
            .await
            .map_err(|e| stream_error(StoreOperation::UploadBlob, e))?;

        let id = blob_id_from_bson(stream.id());
        debug!(filename = %filename, id = %id, size = bytes.len(), "Uploaded blob");
        Ok(id)
    }

    async fn find_blob_by_name(&self, filename: &str) -> StoreResult<Option<BlobMeta>> {
        let mut cursor = self
            .bucket
            .find(doc! { "filename": filename })
            .sort(doc! { "uploadDate": -1, "_id": -1 })
            .limit(1)
            .await
            .map_err(|e| operation_error(StoreOperation::FindBlob, e))?;
        let file = cursor
            .try_next()
            .await
            .map_err(|e| operation_error(StoreOperation::FindBlob, e))?;

        Ok(file.map(blob_meta))
    }

    async fn download_blob(&self, id: &BlobId) -> StoreResult<Vec<u8>> {
        let mut stream = self
            .bucket
            .open_download_stream(blob_id_to_bson(id))
            .await
            .map_err(|e| blob_error(StoreOperation::DownloadBlob, id.as_str(), e))?;

        let mut bytes = Vec::new();
        stream
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| stream_error(StoreOperation::DownloadBlob, e))?;
        debug!(id = %id, size = bytes.len(), "Downloaded blob");

        Ok(bytes)
    }

    async fn delete_blob(&self, id: &BlobId) -> StoreResult<WriteAck> {
        match self.bucket.delete(blob_id_to_bson(id)).await {
            Ok(()) => Ok(WriteAck::acknowledged(true)),
            Err(err) if is_file_not_found(&err) => Ok(WriteAck::acknowledged(false)),
            Err(err) => Err(operation_error(StoreOperation::DeleteBlob, err)),
        }
    }
}

impl Store for MongoStore {
    fn kind(&self) -> BackendKind {
        BackendKind::MongoDB
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_blob_ids_round_trip() {
        let oid = ObjectId::new();
        let id = blob_id_from_bson(&Bson::ObjectId(oid));
        assert_eq!(id.as_str(), oid.to_hex());
        assert_eq!(blob_id_to_bson(&id), Bson::ObjectId(oid));
    }

    #[test]
    fn test_custom_blob_ids_stay_strings() {
        let id = blob_id_from_bson(&Bson::String("texture-1".to_string()));
        assert_eq!(blob_id_to_bson(&id), Bson::String("texture-1".to_string()));
    }
}
