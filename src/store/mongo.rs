//! MongoDB-backed student store.

use super::{StoreError, StudentStore};
use crate::config::MongoConnection;
use crate::students::{NewStudent, Student, StudentId, StudentUpdate};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    options::{ClientOptions, Credential, ReturnDocument, ServerAddress},
};
use serde::{Deserialize, Serialize};

/// On-disk shape of a student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StudentDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ObjectId>,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) course: String,
    pub(crate) gpa: f64,
}

impl From<NewStudent> for StudentDocument {
    fn from(student: NewStudent) -> Self {
        Self {
            id: None,
            name: student.name,
            email: student.email,
            course: student.course,
            gpa: student.gpa,
        }
    }
}

impl TryFrom<StudentDocument> for Student {
    type Error = StoreError;

    fn try_from(document: StudentDocument) -> Result<Self, Self::Error> {
        let id = document.id.ok_or_else(|| {
            StoreError::MalformedDocument("student document is missing `_id`".into())
        })?;
        Ok(Student {
            id: StudentId::from(id),
            name: document.name,
            email: document.email,
            course: document.course,
            gpa: document.gpa,
        })
    }
}

/// Student store backed by a single MongoDB collection.
///
/// The driver client is internally pooled; one instance is shared by every request.
pub struct MongoStudentStore {
    client: Client,
    database: Database,
    collection: Collection<StudentDocument>,
}

impl MongoStudentStore {
    /// Connect to MongoDB and verify the deployment answers a `ping`.
    pub async fn connect(
        connection: &MongoConnection,
        database_name: &str,
        collection_name: &str,
    ) -> Result<Self, StoreError> {
        let options = match connection {
            MongoConnection::Url(url) => ClientOptions::parse(url).await?,
            MongoConnection::Host {
                host,
                port,
                username,
                password,
            } => host_options(host, *port, username.as_deref(), password.as_deref()),
        };
        let hosts: Vec<String> = options.hosts.iter().map(ToString::to_string).collect();
        let client = Client::with_options(options)?;
        let database = client.database(database_name);
        let collection = database.collection::<StudentDocument>(collection_name);
        let store = Self {
            client,
            database,
            collection,
        };
        store.ping().await?;
        tracing::info!(
            hosts = ?hosts,
            database = database_name,
            collection = collection_name,
            "Connected to MongoDB"
        );
        Ok(store)
    }
}

#[async_trait]
impl StudentStore for MongoStudentStore {
    async fn insert(&self, student: NewStudent) -> Result<StudentId, StoreError> {
        let result = self
            .collection
            .insert_one(StudentDocument::from(student))
            .await?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::MalformedDocument(format!(
                "insert returned a non-ObjectId `_id`: {}",
                result.inserted_id
            ))
        })?;
        tracing::debug!(id = %id, "Inserted student document");
        Ok(StudentId::from(id))
    }

    async fn find_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(Student::try_from)
            .transpose()
    }

    async fn find_all(&self, limit: usize) -> Result<Vec<Student>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let documents: Vec<StudentDocument> = self
            .collection
            .find(doc! {})
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        documents.into_iter().map(Student::try_from).collect()
    }

    async fn update_by_id(
        &self,
        id: StudentId,
        update: StudentUpdate,
    ) -> Result<Option<Student>, StoreError> {
        let set = set_document(&update);
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        self.collection
            .find_one_and_update(id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: StudentId) -> Result<u64, StoreError> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        // Store handles stay alive until the process exits, so do not wait on them.
        self.client.clone().shutdown().immediate(true).await;
        tracing::info!("MongoDB client shut down");
    }
}

/// Client options for a single host, authenticating only when a username is configured.
fn host_options(
    host: &str,
    port: u16,
    username: Option<&str>,
    password: Option<&str>,
) -> ClientOptions {
    let mut options = ClientOptions::default();
    options.hosts = vec![ServerAddress::Tcp {
        host: host.to_string(),
        port: Some(port),
    }];
    options.credential = username.map(|username| {
        let mut credential = Credential::default();
        credential.username = Some(username.to_string());
        credential.password = password.map(str::to_string);
        credential
    });
    options
}

fn id_filter(id: StudentId) -> Document {
    doc! { "_id": *id.as_object_id() }
}

/// Build the `$set` body for a partial update, including only provided fields.
pub(crate) fn set_document(update: &StudentUpdate) -> Document {
    let mut set = Document::new();
    if let Some(name) = &update.name {
        set.insert("name", name.as_str());
    }
    if let Some(email) = &update.email {
        set.insert("email", email.as_str());
    }
    if let Some(course) = &update.course {
        set.insert("course", course.as_str());
    }
    if let Some(gpa) = update.gpa {
        set.insert("gpa", gpa);
    }
    set
}
