pub mod access_record;
pub mod credential;

pub use access_record::AccessRecord;
pub use credential::CredentialRow;
