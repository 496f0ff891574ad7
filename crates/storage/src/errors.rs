pub use hearme_domain::storage::StorageError;
